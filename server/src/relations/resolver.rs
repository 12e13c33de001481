use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use super::{RelationsByType, ResolvedRelation};
use crate::error::AtlasError;
use crate::model::{EntityRecord, EntityType, RelationType, Visibility};
use crate::store::{EdgeStore, EntityStore};

/// Relation metadata retained per grouped edge endpoint.
struct GroupEntry {
    id: String,
    relation_type: RelationType,
    strength: Option<u8>,
}

/// Resolves every entity related to an anchor through the edges table.
///
/// Two-phase pipeline: one edge query with a both-directions predicate,
/// then one batched entity fetch per touched type, fired concurrently.
/// Query count is therefore 1 + K for K <= 7 touched types, independent of
/// how many related entities exist.
#[derive(Clone)]
pub struct RelationshipResolver {
    entities: Arc<dyn EntityStore>,
    edges: Arc<dyn EdgeStore>,
}

impl RelationshipResolver {
    pub fn new(entities: Arc<dyn EntityStore>, edges: Arc<dyn EdgeStore>) -> Self {
        Self { entities, edges }
    }

    /// All entities related to `(anchor_type, anchor_id)`, grouped by the
    /// related entity's type, in edge order.
    ///
    /// The anchor itself is not validated here; callers resolve it first.
    /// Edges referencing entities that the visibility filter drops (or that
    /// no longer exist) fall out of the result silently - the edge and
    /// entity tables are not transactionally coupled.
    pub async fn resolve_related(
        &self,
        anchor_type: EntityType,
        anchor_id: &str,
        visibility: Visibility,
    ) -> Result<RelationsByType, AtlasError> {
        let edges = self
            .edges
            .edges_touching(anchor_type, anchor_id, visibility)
            .await
            .map_err(AtlasError::Store)?;

        if edges.is_empty() {
            return Ok(RelationsByType::default());
        }

        // Phase 1: group the far endpoint of each edge by its type,
        // retaining relation metadata in edge order. Self-loops carry no
        // external relation and are skipped.
        let mut groups: HashMap<EntityType, Vec<GroupEntry>> = HashMap::new();
        for edge in &edges {
            let Some((other_type, other_id)) = edge.other_endpoint(anchor_type, anchor_id) else {
                continue;
            };
            groups.entry(other_type).or_default().push(GroupEntry {
                id: other_id.to_string(),
                relation_type: edge.relation_type,
                strength: edge.strength,
            });
        }

        // Phase 2: one batched fetch per touched type, all in flight at
        // once. Any store error aborts the whole resolution - a failed
        // lookup must not masquerade as zero relations.
        let fetches: Vec<_> = EntityType::ALL
            .into_iter()
            .filter_map(|entity_type| {
                let members = groups.get(&entity_type)?;
                let mut seen = HashSet::new();
                let ids: Vec<String> = members
                    .iter()
                    .filter(|member| seen.insert(member.id.as_str()))
                    .map(|member| member.id.clone())
                    .collect();
                let store = Arc::clone(&self.entities);
                Some(async move {
                    store
                        .fetch_by_ids(entity_type, &ids, visibility)
                        .await
                        .map(|rows| (entity_type, rows))
                })
            })
            .collect();

        let fetched = try_join_all(fetches).await.map_err(AtlasError::Store)?;

        let mut result = RelationsByType::default();
        for (entity_type, rows) in fetched {
            let by_id: HashMap<&str, &EntityRecord> =
                rows.iter().map(|row| (row.id.as_str(), row)).collect();
            let Some(members) = groups.get(&entity_type) else {
                continue;
            };

            let bucket = result.bucket_mut(entity_type);
            for member in members {
                let Some(row) = by_id.get(member.id.as_str()) else {
                    debug!(
                        entity_type = %entity_type,
                        entity_id = %member.id,
                        "edge references an entity that did not resolve, dropping"
                    );
                    continue;
                };
                bucket.push(ResolvedRelation {
                    id: row.id.clone(),
                    slug: row.slug.clone(),
                    title: row.display_title(entity_type).to_string(),
                    relation_type: member.relation_type,
                    relation_strength: member.strength,
                });
            }
        }

        Ok(result)
    }
}
