use thiserror::Error;

use crate::model::EntityType;

/// Error taxonomy of the relation/graph surface.
///
/// `Store` is deliberately distinct from an empty result: a failed resolution
/// must never be reported as "zero relations". Dangling edge referents are
/// not represented here at all - they are filtered silently by the resolver.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("entity not found: {entity_type}:{slug}")]
    NotFound {
        entity_type: EntityType,
        slug: String,
    },

    #[error("invalid entity reference '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("store query failed: {0}")]
    Store(anyhow::Error),
}
