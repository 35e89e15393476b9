//! JSON snapshot store on the local filesystem.

use crate::table::Tables;
use crate::{EntityStore, ScanQuery};
use ::async_trait::async_trait;
use mission_core::{Clock, Collection, Fields, MissionResult, StoreError, SystemClock};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// [`EntityStore`] persisted as a single JSON document.
///
/// Every call loads the snapshot, applies one primitive, and for writes
/// replaces the file through a temp-file rename so readers never observe a
/// partial write. Calls through one `FileStore` are serialized; separate
/// processes sharing a file are not coordinated.
pub struct FileStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    guard: Mutex<()>,
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore").field("path", &self.path).finish_non_exhaustive()
    }
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Tables, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Tables::default()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                reason: format!("{}: {}", self.path.display(), e),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Tables::default()),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }

    async fn save(&self, tables: &Tables) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        let contents = serde_json::to_string_pretty(tables)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        message: format!("{}: {}", path.display(), err),
    }
}

#[async_trait]
impl EntityStore for FileStore {
    async fn insert(&self, collection: Collection, fields: Fields) -> MissionResult<String> {
        let _guard = self.guard.lock().await;
        let mut tables = self.load().await?;
        let id = tables.insert(collection, fields, self.clock.now())?;
        self.save(&tables).await?;
        debug!(%collection, %id, path = %self.path.display(), "file insert");
        Ok(id)
    }

    async fn patch(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        let _guard = self.guard.lock().await;
        let mut tables = self.load().await?;
        tables.patch(collection, id, fields)?;
        self.save(&tables).await?;
        debug!(%collection, id, "file patch");
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> MissionResult<Option<Fields>> {
        let _guard = self.guard.lock().await;
        let tables = self.load().await?;
        Ok(tables.get(collection, id))
    }

    async fn scan(&self, query: &ScanQuery) -> MissionResult<Vec<Fields>> {
        let _guard = self.guard.lock().await;
        let tables = self.load().await?;
        let rows = tables.scan(query)?;
        debug!(collection = %query.collection, rows = rows.len(), "file scan");
        Ok(rows)
    }

    async fn replace(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        let _guard = self.guard.lock().await;
        let mut tables = self.load().await?;
        tables.replace(collection, id, fields)?;
        self.save(&tables).await?;
        debug!(%collection, id, "file replace");
        Ok(())
    }
}
