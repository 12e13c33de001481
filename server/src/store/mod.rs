use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::model::{Edge, EntityRecord, EntityType, Visibility};

pub mod io;
pub mod json_edge;
pub mod json_entity;

pub use json_edge::{JsonEdgeStore, JsonEdgeStoreConfig};
pub use json_entity::{JsonEntityStore, JsonEntityStoreConfig};

pub type StoreResult<T> = Result<T>;

/// One free-text search match, ranked. Title/name matches outrank
/// description-only matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchHit {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub rank: f32,
}

/// Read/write access to the seven entity tables, dispatched on
/// [`EntityType`]. All reads take an explicit [`Visibility`].
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn initialize(&self) -> StoreResult<()>;
    async fn finalize(&self) -> StoreResult<()>;

    /// Batched lookup; rows come back in the order their ids were requested,
    /// minus anything the visibility filter drops.
    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[String],
        visibility: Visibility,
    ) -> StoreResult<Vec<EntityRecord>>;

    async fn fetch_by_slug(
        &self,
        entity_type: EntityType,
        slug: &str,
        visibility: Visibility,
    ) -> StoreResult<Option<EntityRecord>>;

    /// All rows of one table, newest first.
    async fn list(
        &self,
        entity_type: EntityType,
        visibility: Visibility,
    ) -> StoreResult<Vec<EntityRecord>>;

    /// Case-insensitive free-text match over the display name and
    /// description of one table. Blank terms match nothing.
    async fn search(
        &self,
        entity_type: EntityType,
        term: &str,
        visibility: Visibility,
    ) -> StoreResult<Vec<SearchHit>>;

    async fn upsert(&self, entity_type: EntityType, record: EntityRecord) -> StoreResult<()>;
    async fn delete(&self, entity_type: EntityType, id: &str) -> StoreResult<()>;

    async fn sync_if_dirty(&self) -> StoreResult<()>;
}

/// Read/write access to the edges table.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    async fn initialize(&self) -> StoreResult<()>;
    async fn finalize(&self) -> StoreResult<()>;

    /// All edges where the given entity appears as either endpoint, in one
    /// query. Ordered by `(created_at, id)` so downstream output is stable.
    async fn edges_touching(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        visibility: Visibility,
    ) -> StoreResult<Vec<Edge>>;

    async fn list(&self, visibility: Visibility) -> StoreResult<Vec<Edge>>;

    async fn upsert(&self, edge: Edge) -> StoreResult<()>;
    async fn delete(&self, id: &str) -> StoreResult<()>;

    async fn sync_if_dirty(&self) -> StoreResult<()>;
}

enum ManagedStore {
    Entity(Arc<dyn EntityStore>),
    Edge(Arc<dyn EdgeStore>),
}

impl ManagedStore {
    async fn initialize(&self) -> StoreResult<()> {
        match self {
            ManagedStore::Entity(store) => store.initialize().await,
            ManagedStore::Edge(store) => store.initialize().await,
        }
    }

    async fn finalize(&self) -> StoreResult<()> {
        match self {
            ManagedStore::Entity(store) => store.finalize().await,
            ManagedStore::Edge(store) => store.finalize().await,
        }
    }
}

/// Sequentially initializes and finalizes registered stores.
#[derive(Default)]
pub struct StoreManager {
    stores: Vec<ManagedStore>,
}

impl StoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_entities<T>(&mut self, store: Arc<T>)
    where
        T: EntityStore + 'static,
    {
        self.stores.push(ManagedStore::Entity(store));
    }

    pub fn register_edges<T>(&mut self, store: Arc<T>)
    where
        T: EdgeStore + 'static,
    {
        self.stores.push(ManagedStore::Edge(store));
    }

    pub async fn initialize_all(&self) -> StoreResult<()> {
        for store in &self.stores {
            store.initialize().await?;
        }
        Ok(())
    }

    pub async fn finalize_all(&self) -> StoreResult<()> {
        for store in &self.stores {
            store.finalize().await?;
        }
        Ok(())
    }
}
