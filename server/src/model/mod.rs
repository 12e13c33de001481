use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::AtlasError;

pub mod edge;
pub mod entity;

pub use edge::Edge;
pub use entity::EntityRecord;

/// The seven content tables of the atlas. Closed set: adding a table means
/// extending this enum and its metadata row below.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EntityType {
    Brands,
    UseCases,
    AiSpecialisms,
    JobRoles,
    Projects,
    TimelineEvents,
    LearningPaths,
}

/// Which column carries the human-readable name for a given table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DisplayField {
    Name,
    Title,
}

struct TypeMeta {
    wire: &'static str,
    label: &'static str,
    url_path: &'static str,
    color: &'static str,
    display_field: DisplayField,
}

/// The single type-to-metadata map; indexed by discriminant, so rows must
/// stay in `EntityType::ALL` order.
static TYPE_META: [TypeMeta; 7] = [
    TypeMeta {
        wire: "brands",
        label: "Brands",
        url_path: "/brands",
        color: "#3b82f6",
        display_field: DisplayField::Name,
    },
    TypeMeta {
        wire: "use_cases",
        label: "Use Cases",
        url_path: "/use-cases",
        color: "#10b981",
        display_field: DisplayField::Title,
    },
    TypeMeta {
        wire: "ai_specialisms",
        label: "AI Specialisms",
        url_path: "/ai",
        color: "#8b5cf6",
        display_field: DisplayField::Name,
    },
    TypeMeta {
        wire: "job_roles",
        label: "Job Roles",
        url_path: "/jobs",
        color: "#f59e0b",
        display_field: DisplayField::Title,
    },
    TypeMeta {
        wire: "projects",
        label: "Projects",
        url_path: "/projects",
        color: "#ef4444",
        display_field: DisplayField::Title,
    },
    TypeMeta {
        wire: "timeline_events",
        label: "Timeline Events",
        url_path: "/timeline",
        color: "#06b6d4",
        display_field: DisplayField::Title,
    },
    TypeMeta {
        wire: "learning_paths",
        label: "Learning Paths",
        url_path: "/paths",
        color: "#ec4899",
        display_field: DisplayField::Title,
    },
];

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Brands,
        EntityType::UseCases,
        EntityType::AiSpecialisms,
        EntityType::JobRoles,
        EntityType::Projects,
        EntityType::TimelineEvents,
        EntityType::LearningPaths,
    ];

    fn meta(self) -> &'static TypeMeta {
        &TYPE_META[self as usize]
    }

    /// Wire identifier, matching the serde representation (`use_cases`, ...).
    pub fn as_str(self) -> &'static str {
        self.meta().wire
    }

    /// Human-readable label ("Use Cases", ...).
    pub fn label(self) -> &'static str {
        self.meta().label
    }

    /// Public URL prefix for this type's detail pages.
    pub fn url_path(self) -> &'static str {
        self.meta().url_path
    }

    /// Fixed palette color for graph rendering, keyed by type so recurring
    /// users learn to recognize categories.
    pub fn color(self) -> &'static str {
        self.meta().color
    }

    pub(crate) fn display_field(self) -> DisplayField {
        self.meta().display_field
    }

    /// Strict parse of a wire identifier. Unknown tokens are the caller's
    /// error to surface, not a default.
    pub fn parse(token: &str) -> Option<EntityType> {
        EntityType::ALL
            .into_iter()
            .find(|entity_type| entity_type.as_str() == token)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The eight semantic labels an edge can carry. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RelationType {
    Implements,
    Enables,
    Transforms,
    Requires,
    Influences,
    Demonstrates,
    Includes,
    RelatedTo,
}

impl RelationType {
    pub const ALL: [RelationType; 8] = [
        RelationType::Implements,
        RelationType::Enables,
        RelationType::Transforms,
        RelationType::Requires,
        RelationType::Influences,
        RelationType::Demonstrates,
        RelationType::Includes,
        RelationType::RelatedTo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Implements => "implements",
            RelationType::Enables => "enables",
            RelationType::Transforms => "transforms",
            RelationType::Requires => "requires",
            RelationType::Influences => "influences",
            RelationType::Demonstrates => "demonstrates",
            RelationType::Includes => "includes",
            RelationType::RelatedTo => "related_to",
        }
    }

    /// Edge label as shown on the rendered graph (`related_to` -> "related to").
    pub fn humanize(self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn parse(token: &str) -> Option<RelationType> {
        RelationType::ALL
            .into_iter()
            .find(|relation_type| relation_type.as_str() == token)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is asking. Replaces ambient role checks: every store read and the
/// resolver take this explicitly, and the caller decides which view applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Public consumers: only `published = true` rows are visible.
    PublishedOnly,
    /// Privileged callers (admin surface): drafts included.
    IncludeDrafts,
}

impl Visibility {
    pub fn allows(self, published: bool) -> bool {
        match self {
            Visibility::PublishedOnly => published,
            Visibility::IncludeDrafts => true,
        }
    }
}

/// A caller-supplied `"entityType:slug"` anchor reference.
///
/// Split at the first colon only: slugs may themselves contain colons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub entity_type: EntityType,
    pub slug: String,
}

impl EntityRef {
    pub fn parse(input: &str) -> Result<EntityRef, AtlasError> {
        let Some((token, slug)) = input.split_once(':') else {
            return Err(AtlasError::InvalidInput {
                input: input.to_string(),
                reason: "expected the form entityType:slug".to_string(),
            });
        };

        let Some(entity_type) = EntityType::parse(token) else {
            return Err(AtlasError::InvalidInput {
                input: input.to_string(),
                reason: format!("unknown entity type '{token}'"),
            });
        };

        if slug.is_empty() {
            return Err(AtlasError::InvalidInput {
                input: input.to_string(),
                reason: "slug is empty".to_string(),
            });
        }

        Ok(EntityRef {
            entity_type,
            slug: slug.to_string(),
        })
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.slug)
    }
}
