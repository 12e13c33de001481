use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use super::error_response;
use crate::AppState;
use crate::graph::GraphView;
use crate::model::{EntityRef, Visibility};

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    /// Anchor reference in `entityType:slug` form.
    pub entity: String,
}

pub fn graph_routes() -> Router<Arc<AppState>> {
    Router::new().route("/graph", get(get_graph))
}

async fn get_graph(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<GraphView>, (StatusCode, String)> {
    // malformed references are rejected before any store query runs
    let reference = EntityRef::parse(&query.entity).map_err(error_response)?;

    let graph = state
        .graph
        .graph_for(&reference, Visibility::PublishedOnly)
        .await
        .map_err(error_response)?;

    Ok(Json(graph))
}
