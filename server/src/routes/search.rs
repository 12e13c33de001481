use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use futures::future::try_join_all;
use serde::Deserialize;

use super::error_response;
use super::types::SearchResponse;
use crate::AppState;
use crate::error::AtlasError;
use crate::model::{EntityType, Visibility};
use crate::store::EntityStore;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub fn search_routes() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search))
}

/// Free-text search across all seven tables, one query per type fired
/// concurrently, grouped by type. A blank query is an empty result, not an
/// error.
async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let term = query.q.unwrap_or_default();
    let term = term.trim();
    if term.is_empty() {
        return Ok(Json(SearchResponse {
            results: BTreeMap::new(),
        }));
    }

    let searches: Vec<_> = EntityType::ALL
        .into_iter()
        .map(|entity_type| {
            let store = Arc::clone(&state.entities);
            let term = term.to_string();
            async move {
                store
                    .search(entity_type, &term, Visibility::PublishedOnly)
                    .await
                    .map(|hits| (entity_type, hits))
            }
        })
        .collect();

    let grouped = try_join_all(searches)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;

    let results: BTreeMap<_, _> = grouped
        .into_iter()
        .filter(|(_, hits)| !hits.is_empty())
        .collect();

    Ok(Json(SearchResponse { results }))
}
