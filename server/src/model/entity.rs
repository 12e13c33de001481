use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{DisplayField, EntityType};

/// One row of any of the seven entity tables, normalized to a single
/// canonical shape. Per-type attribute columns (founded_year, maturity, ...)
/// are a collaborator concern and are not modeled here; the core only needs
/// identity, visibility and a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EntityRecord {
    pub id: String,
    pub slug: String,
    pub published: bool,
    /// Display name for brand-like tables (brands, ai_specialisms).
    #[serde(default)]
    pub name: Option<String>,
    /// Display name for the remaining tables.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityRecord {
    /// The human-readable title, resolved through the type's display-name
    /// field and falling back to the other field, then the slug.
    pub fn display_title(&self, entity_type: EntityType) -> &str {
        let (preferred, fallback) = match entity_type.display_field() {
            DisplayField::Name => (&self.name, &self.title),
            DisplayField::Title => (&self.title, &self.name),
        };
        preferred
            .as_deref()
            .or(fallback.as_deref())
            .unwrap_or(&self.slug)
    }
}
