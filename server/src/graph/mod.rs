use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::model::{EntityRecord, EntityType};
use crate::relations::RelationsByType;

pub mod layout;
pub mod service;

pub use layout::{LayoutConfig, LayoutEngine};
pub use service::GraphService;

/// Anchor nodes render larger than the entities around them.
pub const ANCHOR_NODE_WIDTH: f32 = 200.0;
pub const ANCHOR_NODE_HEIGHT: f32 = 80.0;
pub const RELATED_NODE_WIDTH: f32 = 180.0;
pub const RELATED_NODE_HEIGHT: f32 = 60.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// One renderable node. `position` is the top-left render origin,
/// consistent with the declared `width`/`height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub entity_type: EntityType,
    pub slug: String,
    /// Detail-page link for node clicks.
    pub href: String,
    pub color: String,
    pub position: Position,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

/// A renderable graph, built fresh per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Construct the abstract graph for an anchor and its resolved relations:
/// the anchor as a larger root node, one node per distinct related entity
/// (colored by type), and one labeled edge per relation entry. Positions
/// are zeroed here; [`LayoutEngine::layout`] assigns them.
pub fn build_graph(
    anchor_type: EntityType,
    anchor: &EntityRecord,
    relations: &RelationsByType,
) -> GraphView {
    let mut nodes = Vec::with_capacity(relations.total() + 1);
    let mut edges = Vec::with_capacity(relations.total());

    nodes.push(GraphNode {
        id: anchor.id.clone(),
        label: anchor.display_title(anchor_type).to_string(),
        entity_type: anchor_type,
        slug: anchor.slug.clone(),
        href: entity_href(anchor_type, &anchor.slug),
        color: anchor_type.color().to_string(),
        position: Position::default(),
        width: ANCHOR_NODE_WIDTH,
        height: ANCHOR_NODE_HEIGHT,
    });

    // Two relations to the same entity share one node but keep their own
    // labeled edges.
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(&anchor.id);

    for (entity_type, bucket) in relations.buckets() {
        for relation in bucket {
            if seen.insert(&relation.id) {
                nodes.push(GraphNode {
                    id: relation.id.clone(),
                    label: relation.title.clone(),
                    entity_type,
                    slug: relation.slug.clone(),
                    href: entity_href(entity_type, &relation.slug),
                    color: entity_type.color().to_string(),
                    position: Position::default(),
                    width: RELATED_NODE_WIDTH,
                    height: RELATED_NODE_HEIGHT,
                });
            }
            edges.push(GraphEdge {
                id: format!(
                    "{}-{}-{}",
                    anchor.id,
                    relation.id,
                    relation.relation_type.as_str()
                ),
                source: anchor.id.clone(),
                target: relation.id.clone(),
                label: relation.relation_type.humanize(),
            });
        }
    }

    GraphView { nodes, edges }
}

fn entity_href(entity_type: EntityType, slug: &str) -> String {
    format!("{}/{}", entity_type.url_path(), slug)
}
