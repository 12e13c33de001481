use std::{
    collections::HashMap,
    path::PathBuf,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::io::{load_table, persist_table};
use super::{EntityStore, SearchHit, StoreResult};
use crate::model::{EntityRecord, EntityType, Visibility};

#[derive(Clone, Debug)]
pub struct JsonEntityStoreConfig {
    pub working_dir: PathBuf,
}

/// JSON-file-backed implementation of [`EntityStore`]: one file per entity
/// table under the working dir, held in memory behind an `RwLock` and
/// persisted atomically when dirty.
pub struct JsonEntityStore {
    working_dir: PathBuf,
    tables: RwLock<HashMap<EntityType, HashMap<String, EntityRecord>>>,
    dirty: AtomicBool,
    reads: AtomicU64,
}

impl JsonEntityStore {
    pub fn new(config: JsonEntityStoreConfig) -> Self {
        Self {
            working_dir: config.working_dir,
            tables: RwLock::new(HashMap::new()),
            dirty: AtomicBool::new(false),
            reads: AtomicU64::new(0),
        }
    }

    /// Number of read queries issued since construction. One batched
    /// `fetch_by_ids` counts as one query however many ids it carries.
    pub fn query_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn table_path(&self, entity_type: EntityType) -> PathBuf {
        self.working_dir
            .join(format!("entities_{}.json", entity_type))
    }

    fn count_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EntityStore for JsonEntityStore {
    async fn initialize(&self) -> StoreResult<()> {
        let mut loaded = HashMap::with_capacity(EntityType::ALL.len());
        for entity_type in EntityType::ALL {
            let path = self.table_path(entity_type);
            let table: HashMap<String, EntityRecord> = load_table(&path)
                .await
                .with_context(|| format!("failed to load entity table {entity_type}"))?;
            loaded.insert(entity_type, table);
        }
        *self.tables.write().await = loaded;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn finalize(&self) -> StoreResult<()> {
        self.sync_if_dirty().await
    }

    async fn fetch_by_ids(
        &self,
        entity_type: EntityType,
        ids: &[String],
        visibility: Visibility,
    ) -> StoreResult<Vec<EntityRecord>> {
        self.count_read();
        let guard = self.tables.read().await;
        let Some(table) = guard.get(&entity_type) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| table.get(id))
            .filter(|record| visibility.allows(record.published))
            .cloned()
            .collect())
    }

    async fn fetch_by_slug(
        &self,
        entity_type: EntityType,
        slug: &str,
        visibility: Visibility,
    ) -> StoreResult<Option<EntityRecord>> {
        self.count_read();
        let guard = self.tables.read().await;
        Ok(guard.get(&entity_type).and_then(|table| {
            table
                .values()
                .find(|record| record.slug == slug && visibility.allows(record.published))
                .cloned()
        }))
    }

    async fn list(
        &self,
        entity_type: EntityType,
        visibility: Visibility,
    ) -> StoreResult<Vec<EntityRecord>> {
        self.count_read();
        let guard = self.tables.read().await;
        let mut rows: Vec<EntityRecord> = guard
            .get(&entity_type)
            .map(|table| {
                table
                    .values()
                    .filter(|record| visibility.allows(record.published))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn search(
        &self,
        entity_type: EntityType,
        term: &str,
        visibility: Visibility,
    ) -> StoreResult<Vec<SearchHit>> {
        self.count_read();
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let guard = self.tables.read().await;
        let Some(table) = guard.get(&entity_type) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<(&EntityRecord, f32)> = table
            .values()
            .filter(|record| visibility.allows(record.published))
            .filter_map(|record| {
                let title = record.display_title(entity_type);
                if title.to_lowercase().contains(&term) {
                    return Some((record, 1.0));
                }
                let description = record.description.as_deref().unwrap_or_default();
                if description.to_lowercase().contains(&term) {
                    return Some((record, 0.5));
                }
                None
            })
            .collect();

        matches.sort_by(|(a, rank_a), (b, rank_b)| {
            rank_b
                .total_cmp(rank_a)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(matches
            .into_iter()
            .map(|(record, rank)| SearchHit {
                id: record.id.clone(),
                slug: record.slug.clone(),
                title: record.display_title(entity_type).to_string(),
                rank,
            })
            .collect())
    }

    async fn upsert(&self, entity_type: EntityType, record: EntityRecord) -> StoreResult<()> {
        let mut guard = self.tables.write().await;
        guard
            .entry(entity_type)
            .or_default()
            .insert(record.id.clone(), record);
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, entity_type: EntityType, id: &str) -> StoreResult<()> {
        let mut guard = self.tables.write().await;
        let removed = guard
            .get_mut(&entity_type)
            .and_then(|table| table.remove(id));
        if removed.is_some() {
            self.dirty.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn sync_if_dirty(&self) -> StoreResult<()> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let snapshot = {
            let guard = self.tables.read().await;
            guard.clone()
        };

        for entity_type in EntityType::ALL {
            let table = snapshot.get(&entity_type).cloned().unwrap_or_default();
            persist_table(&self.table_path(entity_type), &table)
                .await
                .with_context(|| format!("failed to write entity table {entity_type}"))?;
        }
        Ok(())
    }
}
