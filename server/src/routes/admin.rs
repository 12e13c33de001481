use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::types::{AdminWriteResponse, EdgeListResponse};
use super::{error_response, parse_entity_type};
use crate::AppState;
use crate::error::AtlasError;
use crate::model::{Edge, EntityRecord, EntityType, RelationType, Visibility};
use crate::store::{EdgeStore, EntityStore};

/// Curation surface. Deployment is expected to gate these routes; there is
/// no in-process auth, and all reads here include drafts.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/entities/{entity_type}", put(upsert_entity))
        .route("/admin/entities/{entity_type}/{id}", delete(delete_entity))
        .route("/admin/edges", get(list_edges).put(upsert_edge))
        .route("/admin/edges/{id}", delete(delete_edge))
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct EntityUpsert {
    /// Omitted on create; the server mints a v4 id.
    pub id: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub published: bool,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct EdgeUpsert {
    pub id: Option<String>,
    pub from_type: EntityType,
    pub from_id: String,
    pub to_type: EntityType,
    pub to_id: String,
    pub relation_type: RelationType,
    pub strength: Option<u8>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

async fn upsert_entity(
    State(state): State<Arc<AppState>>,
    Path(entity_type): Path<String>,
    Json(payload): Json<EntityUpsert>,
) -> Result<Json<AdminWriteResponse>, (StatusCode, String)> {
    let entity_type = parse_entity_type(&entity_type)?;

    if payload.slug.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "slug must not be empty".to_string()));
    }

    // slug is the public identity within a type; refuse to let two ids
    // claim the same one
    let slug_owner = state
        .entities
        .fetch_by_slug(entity_type, &payload.slug, Visibility::IncludeDrafts)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;

    let id = payload
        .id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Some(owner) = &slug_owner {
        if owner.id != id {
            return Err((
                StatusCode::CONFLICT,
                format!(
                    "slug '{}' already belongs to {}:{}",
                    payload.slug, entity_type, owner.id
                ),
            ));
        }
    }

    let existing = state
        .entities
        .fetch_by_ids(entity_type, std::slice::from_ref(&id), Visibility::IncludeDrafts)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?
        .into_iter()
        .next();

    let now = Utc::now();
    let record = EntityRecord {
        id: id.clone(),
        slug: payload.slug,
        published: payload.published,
        name: payload.name,
        title: payload.title,
        description: payload.description,
        tags: payload.tags,
        created_at: existing.as_ref().map(|row| row.created_at).unwrap_or(now),
        updated_at: now,
    };

    state
        .entities
        .upsert(entity_type, record)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;
    state
        .entities
        .sync_if_dirty()
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;

    info!(entity_type = %entity_type, id = %id, "entity upserted");

    Ok(Json(AdminWriteResponse {
        status: "ok".to_string(),
        id,
        message: format!("{} saved", entity_type.label()),
    }))
}

async fn delete_entity(
    State(state): State<Arc<AppState>>,
    Path((entity_type, id)): Path<(String, String)>,
) -> Result<Json<AdminWriteResponse>, (StatusCode, String)> {
    let entity_type = parse_entity_type(&entity_type)?;

    state
        .entities
        .delete(entity_type, &id)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;
    state
        .entities
        .sync_if_dirty()
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;

    info!(entity_type = %entity_type, id = %id, "entity deleted");

    Ok(Json(AdminWriteResponse {
        status: "ok".to_string(),
        id,
        message: format!("{} deleted", entity_type.label()),
    }))
}

async fn list_edges(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EdgeListResponse>, (StatusCode, String)> {
    let edges = state
        .edges
        .list(Visibility::IncludeDrafts)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;

    Ok(Json(EdgeListResponse {
        total: edges.len(),
        edges,
    }))
}

async fn upsert_edge(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EdgeUpsert>,
) -> Result<Json<AdminWriteResponse>, (StatusCode, String)> {
    if let Err(reason) = validate_edge(&payload) {
        return Err((StatusCode::BAD_REQUEST, reason));
    }

    // both endpoints must exist (drafts count); the resolver tolerates
    // dangling references, but there is no reason to create one
    for (entity_type, entity_id) in [
        (payload.from_type, &payload.from_id),
        (payload.to_type, &payload.to_id),
    ] {
        let found = state
            .entities
            .fetch_by_ids(
                entity_type,
                std::slice::from_ref(entity_id),
                Visibility::IncludeDrafts,
            )
            .await
            .map_err(|err| error_response(AtlasError::Store(err)))?;
        if found.is_empty() {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("no {} entity with id '{}'", entity_type, entity_id),
            ));
        }
    }

    let id = payload
        .id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let existing = state
        .edges
        .list(Visibility::IncludeDrafts)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?
        .into_iter()
        .find(|edge| edge.id == id);

    let now = Utc::now();
    let edge = Edge {
        id: id.clone(),
        from_type: payload.from_type,
        from_id: payload.from_id,
        to_type: payload.to_type,
        to_id: payload.to_id,
        relation_type: payload.relation_type,
        strength: payload.strength,
        published: payload.published,
        metadata: payload.metadata,
        created_at: existing.as_ref().map(|edge| edge.created_at).unwrap_or(now),
        updated_at: now,
    };

    state
        .edges
        .upsert(edge)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;
    state
        .edges
        .sync_if_dirty()
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;

    info!(id = %id, "edge upserted");

    Ok(Json(AdminWriteResponse {
        status: "ok".to_string(),
        id,
        message: "edge saved".to_string(),
    }))
}

async fn delete_edge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AdminWriteResponse>, (StatusCode, String)> {
    state
        .edges
        .delete(&id)
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;
    state
        .edges
        .sync_if_dirty()
        .await
        .map_err(|err| error_response(AtlasError::Store(err)))?;

    info!(id = %id, "edge deleted");

    Ok(Json(AdminWriteResponse {
        status: "ok".to_string(),
        id,
        message: "edge deleted".to_string(),
    }))
}

/// Edge invariants enforced at the write path: no self-loops, strength in
/// 1-5 when present.
fn validate_edge(payload: &EdgeUpsert) -> Result<(), String> {
    if payload.from_type == payload.to_type && payload.from_id == payload.to_id {
        return Err("an edge must connect two distinct entities".to_string());
    }
    if let Some(strength) = payload.strength {
        if !(1..=5).contains(&strength) {
            return Err(format!("strength must be between 1 and 5, got {strength}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert(strength: Option<u8>, to_id: &str) -> EdgeUpsert {
        EdgeUpsert {
            id: None,
            from_type: EntityType::Brands,
            from_id: "b-1".to_string(),
            to_type: EntityType::Brands,
            to_id: to_id.to_string(),
            relation_type: RelationType::RelatedTo,
            strength,
            published: true,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn validate_edge_rejects_self_loops() {
        assert!(validate_edge(&upsert(None, "b-1")).is_err());
        assert!(validate_edge(&upsert(None, "b-2")).is_ok());
    }

    #[test]
    fn validate_edge_checks_strength_range() {
        assert!(validate_edge(&upsert(Some(0), "b-2")).is_err());
        assert!(validate_edge(&upsert(Some(6), "b-2")).is_err());
        assert!(validate_edge(&upsert(Some(1), "b-2")).is_ok());
        assert!(validate_edge(&upsert(Some(5), "b-2")).is_ok());
    }
}
