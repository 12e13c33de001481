use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use super::types::EntityListResponse;
use super::{error_response, parse_entity_type};
use crate::error::AtlasError;
use crate::model::{EntityRecord, Visibility};
use crate::relations::RelationsByType;
use crate::store::EntityStore;
use crate::AppState;

pub fn entity_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/entities/{entity_type}", get(list_entities))
        .route("/entities/{entity_type}/{slug}", get(entity_detail))
        .route("/entities/{entity_type}/{slug}/related", get(entity_related))
}

async fn list_entities(
    State(state): State<Arc<AppState>>,
    Path(entity_type): Path<String>,
) -> Result<Json<EntityListResponse>, (StatusCode, String)> {
    let entity_type = parse_entity_type(&entity_type)?;
    let entities = state
        .entities
        .list(entity_type, Visibility::PublishedOnly)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;

    Ok(Json(EntityListResponse {
        total: entities.len(),
        entities,
    }))
}

async fn entity_detail(
    State(state): State<Arc<AppState>>,
    Path((entity_type, slug)): Path<(String, String)>,
) -> Result<Json<EntityRecord>, (StatusCode, String)> {
    let entity_type = parse_entity_type(&entity_type)?;
    let record = state
        .entities
        .fetch_by_slug(entity_type, &slug, Visibility::PublishedOnly)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?
        .ok_or_else(|| error_response(AtlasError::NotFound { entity_type, slug }))?;

    Ok(Json(record))
}

/// Relation buckets for the entity's detail page ("Related Content").
async fn entity_related(
    State(state): State<Arc<AppState>>,
    Path((entity_type, slug)): Path<(String, String)>,
) -> Result<Json<RelationsByType>, (StatusCode, String)> {
    let entity_type = parse_entity_type(&entity_type)?;

    // resolve the anchor first so a missing slug surfaces as NotFound
    // rather than as seven empty buckets
    let record = state
        .entities
        .fetch_by_slug(entity_type, &slug, Visibility::PublishedOnly)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?
        .ok_or_else(|| error_response(AtlasError::NotFound { entity_type, slug }))?;

    let related = state
        .resolver
        .resolve_related(entity_type, &record.id, Visibility::PublishedOnly)
        .await
        .map_err(error_response)?;

    Ok(Json(related))
}
