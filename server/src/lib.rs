use std::sync::Arc;

use crate::config::AppConfig;
use crate::graph::GraphService;
use crate::relations::RelationshipResolver;
use crate::store::{JsonEdgeStore, JsonEntityStore};

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod relations;
pub mod routes;
pub mod store;

/// Shared state behind every route handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub entities: Arc<JsonEntityStore>,
    pub edges: Arc<JsonEdgeStore>,
    pub resolver: RelationshipResolver,
    pub graph: GraphService,
}
