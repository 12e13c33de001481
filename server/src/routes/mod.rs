use axum::http::StatusCode;
use tracing::error;

use crate::error::AtlasError;
use crate::model::EntityType;

pub mod admin;
pub mod entities;
pub mod graph;
pub mod search;

pub mod types;

pub use admin::admin_routes;
pub use entities::entity_routes;
pub use graph::graph_routes;
pub use search::search_routes;

/// Map the core error taxonomy onto HTTP. Store failures must stay
/// distinguishable from empty results, so they become a 500 with a retry
/// hint rather than degrading to an empty payload.
pub(crate) fn error_response(err: AtlasError) -> (StatusCode, String) {
    match err {
        AtlasError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        AtlasError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        AtlasError::Store(source) => {
            error!(error = %source, "store query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "relations unavailable, please retry".to_string(),
            )
        }
    }
}

pub(crate) fn parse_entity_type(token: &str) -> Result<EntityType, (StatusCode, String)> {
    EntityType::parse(token).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("unknown entity type '{token}'"),
        )
    })
}
