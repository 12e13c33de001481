use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

use crate::model::{Edge, EntityRecord, EntityType};
use crate::store::SearchHit;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct EntityListResponse {
    pub total: usize,
    pub entities: Vec<EntityRecord>,
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct EdgeListResponse {
    pub total: usize,
    pub edges: Vec<Edge>,
}

/// Search results grouped by entity type; types with no matches are
/// omitted entirely.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct SearchResponse {
    pub results: BTreeMap<EntityType, Vec<SearchHit>>,
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct AdminWriteResponse {
    pub status: String,
    pub id: String,
    pub message: String,
}
