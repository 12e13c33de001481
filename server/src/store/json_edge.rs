use std::{
    collections::HashMap,
    path::PathBuf,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::io::{load_table, persist_table};
use super::{EdgeStore, StoreResult};
use crate::model::{Edge, EntityType, Visibility};

#[derive(Clone, Debug)]
pub struct JsonEdgeStoreConfig {
    pub working_dir: PathBuf,
}

/// JSON-file-backed implementation of [`EdgeStore`]. The whole edges table
/// lives in one file; reads come back ordered by `(created_at, id)` so
/// resolver output is stable across runs.
pub struct JsonEdgeStore {
    file_path: PathBuf,
    edges: RwLock<HashMap<String, Edge>>,
    dirty: AtomicBool,
    reads: AtomicU64,
}

impl JsonEdgeStore {
    pub fn new(config: JsonEdgeStoreConfig) -> Self {
        Self {
            file_path: config.working_dir.join("edges.json"),
            edges: RwLock::new(HashMap::new()),
            dirty: AtomicBool::new(false),
            reads: AtomicU64::new(0),
        }
    }

    /// Number of read queries issued since construction.
    pub fn query_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn sort_stable(edges: &mut [Edge]) {
        edges.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}

#[async_trait]
impl EdgeStore for JsonEdgeStore {
    async fn initialize(&self) -> StoreResult<()> {
        let table: HashMap<String, Edge> = load_table(&self.file_path)
            .await
            .context("failed to load edges table")?;
        *self.edges.write().await = table;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn finalize(&self) -> StoreResult<()> {
        self.sync_if_dirty().await
    }

    async fn edges_touching(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        visibility: Visibility,
    ) -> StoreResult<Vec<Edge>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let guard = self.edges.read().await;
        let mut touching: Vec<Edge> = guard
            .values()
            .filter(|edge| visibility.allows(edge.published))
            .filter(|edge| edge.touches(entity_type, entity_id))
            .cloned()
            .collect();
        Self::sort_stable(&mut touching);
        Ok(touching)
    }

    async fn list(&self, visibility: Visibility) -> StoreResult<Vec<Edge>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let guard = self.edges.read().await;
        let mut all: Vec<Edge> = guard
            .values()
            .filter(|edge| visibility.allows(edge.published))
            .cloned()
            .collect();
        Self::sort_stable(&mut all);
        Ok(all)
    }

    async fn upsert(&self, edge: Edge) -> StoreResult<()> {
        let mut guard = self.edges.write().await;
        guard.insert(edge.id.clone(), edge);
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut guard = self.edges.write().await;
        if guard.remove(id).is_some() {
            self.dirty.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn sync_if_dirty(&self) -> StoreResult<()> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let snapshot = {
            let guard = self.edges.read().await;
            guard.clone()
        };

        persist_table(&self.file_path, &snapshot)
            .await
            .context("failed to write edges table")?;
        Ok(())
    }
}
