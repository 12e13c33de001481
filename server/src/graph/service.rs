use std::sync::Arc;

use tracing::debug;

use super::{GraphView, LayoutEngine, build_graph};
use crate::error::AtlasError;
use crate::model::{EntityRef, Visibility};
use crate::relations::RelationshipResolver;
use crate::store::{EdgeStore, EntityStore};

/// Orchestrates one graph-view request: anchor lookup, relation resolution,
/// graph construction, layout. Each request builds a fresh graph; there is
/// no incremental re-layout when the anchor changes.
#[derive(Clone)]
pub struct GraphService {
    entities: Arc<dyn EntityStore>,
    resolver: RelationshipResolver,
    layout: LayoutEngine,
}

impl GraphService {
    pub fn new(entities: Arc<dyn EntityStore>, edges: Arc<dyn EdgeStore>) -> Self {
        let resolver = RelationshipResolver::new(Arc::clone(&entities), edges);
        Self {
            entities,
            resolver,
            layout: LayoutEngine::default(),
        }
    }

    /// Resolve and lay out the graph around the referenced anchor.
    ///
    /// An anchor that does not resolve is NotFound and no layout is
    /// attempted; an anchor with no relations yields a one-node graph.
    pub async fn graph_for(
        &self,
        reference: &EntityRef,
        visibility: Visibility,
    ) -> Result<GraphView, AtlasError> {
        let anchor = self
            .entities
            .fetch_by_slug(reference.entity_type, &reference.slug, visibility)
            .await
            .map_err(AtlasError::Store)?
            .ok_or_else(|| AtlasError::NotFound {
                entity_type: reference.entity_type,
                slug: reference.slug.clone(),
            })?;

        let relations = self
            .resolver
            .resolve_related(reference.entity_type, &anchor.id, visibility)
            .await?;

        let mut graph = build_graph(reference.entity_type, &anchor, &relations);
        self.layout.layout(&mut graph);
        debug!(
            anchor = %reference,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "graph laid out"
        );
        Ok(graph)
    }
}
