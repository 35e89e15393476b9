//! Process-local store.

use crate::table::Tables;
use crate::{EntityStore, ScanQuery};
use ::async_trait::async_trait;
use mission_core::{Clock, Collection, Fields, MissionResult, StoreError, SystemClock};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// In-memory [`EntityStore`]. Clones share the same tables.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `_creationTime` stamps come from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            clock,
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert(&self, collection: Collection, fields: Fields) -> MissionResult<String> {
        let now = self.clock.now();
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = tables.insert(collection, fields, now)?;
        debug!(%collection, %id, "memory insert");
        Ok(id)
    }

    async fn patch(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        debug!(%collection, id, keys = fields.len(), "memory patch");
        tables.patch(collection, id, fields)
    }

    async fn get(&self, collection: Collection, id: &str) -> MissionResult<Option<Fields>> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(tables.get(collection, id))
    }

    async fn scan(&self, query: &ScanQuery) -> MissionResult<Vec<Fields>> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        let rows = tables.scan(query)?;
        debug!(collection = %query.collection, rows = rows.len(), "memory scan");
        Ok(rows)
    }

    async fn replace(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        debug!(%collection, id, "memory replace");
        tables.replace(collection, id, fields)
    }
}
