use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{EntityType, RelationType};

/// A directed, typed link between two entities, possibly of different types.
///
/// Edges are stored directed but discovered undirected: an edge touching an
/// entity on either side yields a related entity on the other side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Edge {
    pub id: String,
    pub from_type: EntityType,
    pub from_id: String,
    pub to_type: EntityType,
    pub to_id: String,
    pub relation_type: RelationType,
    /// Subjective relationship weight, 1-5. Range-checked at the write path.
    #[serde(default)]
    pub strength: Option<u8>,
    pub published: bool,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Edge {
    /// Whether this edge has the given entity as either endpoint.
    pub fn touches(&self, entity_type: EntityType, entity_id: &str) -> bool {
        (self.from_type == entity_type && self.from_id == entity_id)
            || (self.to_type == entity_type && self.to_id == entity_id)
    }

    /// The endpoint opposite the given anchor, or `None` when the edge does
    /// not touch the anchor at all or is a true self-loop (anchor on both
    /// sides) - a self-loop carries no external relation.
    pub fn other_endpoint(
        &self,
        anchor_type: EntityType,
        anchor_id: &str,
    ) -> Option<(EntityType, &str)> {
        let matches_from = self.from_type == anchor_type && self.from_id == anchor_id;
        let matches_to = self.to_type == anchor_type && self.to_id == anchor_id;
        match (matches_from, matches_to) {
            (true, true) | (false, false) => None,
            (true, false) => Some((self.to_type, &self.to_id)),
            (false, true) => Some((self.from_type, &self.from_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: (EntityType, &str), to: (EntityType, &str)) -> Edge {
        Edge {
            id: "edge-1".to_string(),
            from_type: from.0,
            from_id: from.1.to_string(),
            to_type: to.0,
            to_id: to.1.to_string(),
            relation_type: RelationType::RelatedTo,
            strength: None,
            published: true,
            metadata: serde_json::Value::Null,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn other_endpoint_works_in_both_directions() {
        let edge = edge((EntityType::Brands, "b-1"), (EntityType::UseCases, "u-1"));

        assert_eq!(
            edge.other_endpoint(EntityType::Brands, "b-1"),
            Some((EntityType::UseCases, "u-1"))
        );
        assert_eq!(
            edge.other_endpoint(EntityType::UseCases, "u-1"),
            Some((EntityType::Brands, "b-1"))
        );
    }

    #[test]
    fn other_endpoint_ignores_non_touching_and_self_loops() {
        let plain = edge((EntityType::Brands, "b-1"), (EntityType::UseCases, "u-1"));
        assert_eq!(plain.other_endpoint(EntityType::Projects, "p-1"), None);
        // same id under a different type is a different entity
        assert_eq!(plain.other_endpoint(EntityType::Projects, "b-1"), None);

        let self_loop = edge((EntityType::Brands, "b-1"), (EntityType::Brands, "b-1"));
        assert_eq!(self_loop.other_endpoint(EntityType::Brands, "b-1"), None);
    }
}
