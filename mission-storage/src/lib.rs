//! Mission Control Storage - Entity Store Contract
//!
//! Defines the `EntityStore` trait every backend implements: keyed inserts,
//! partial patches, point reads, ordered scans over declared indexes, and a
//! full replace used by natural-key upserts. Three backends ship here:
//!
//! - [`MemoryStore`]: process-local, used by tests
//! - [`FileStore`]: JSON snapshot on disk, the default for the `mc` binary
//! - [`HttpStore`]: a remote document store reached over HTTP
//!
//! Each primitive is atomic on its own. Nothing here spans calls: a
//! read followed by a write can interleave with another writer.

mod file;
mod http;
mod memory;
pub mod schema;
mod table;
mod typed;

pub use file::FileStore;
pub use http::{HttpStore, HttpStoreConfig};
pub use memory::MemoryStore;
pub use typed::{get_record, insert_record, scan_records};

use ::async_trait::async_trait;
use mission_core::{Collection, Fields, MissionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

// ============================================================================
// SCAN QUERY
// ============================================================================

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// Index restriction of a scan: order by the index field, optionally keeping
/// only records whose field equals `eq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRange {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<Value>,
}

/// Parameters of a scan over one collection.
///
/// Without an index, records come back in creation order (reversed for
/// [`Order::Desc`]). With an index, they are ordered by the index field with
/// ties in creation order. `limit` applies after ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanQuery {
    pub collection: Collection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexRange>,
    #[serde(default)]
    pub order: Order,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ScanQuery {
    /// Every record of a collection, oldest first.
    pub fn all(collection: Collection) -> Self {
        Self {
            collection,
            index: None,
            order: Order::Asc,
            limit: None,
        }
    }

    /// Records whose indexed field equals `value`.
    pub fn eq(collection: Collection, index: &str, value: impl Into<Value>) -> Self {
        Self::all(collection).with_index(index, Some(value.into()))
    }

    pub fn with_index(mut self, name: &str, eq: Option<Value>) -> Self {
        self.index = Some(IndexRange {
            name: name.to_string(),
            eq,
        });
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// ENTITY STORE TRAIT
// ============================================================================

/// Storage primitives for the record collections.
///
/// Records cross this boundary as [`Fields`] maps. Stored records always carry
/// `_id` and `_creationTime`; callers never supply either.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a new record and return its store-assigned identifier.
    async fn insert(&self, collection: Collection, fields: Fields) -> MissionResult<String>;

    /// Merge `fields` into an existing record. A `null` value removes the field.
    async fn patch(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()>;

    /// Read a record by identifier.
    async fn get(&self, collection: Collection, id: &str) -> MissionResult<Option<Fields>>;

    /// Ordered, optionally filtered scan of one collection.
    async fn scan(&self, query: &ScanQuery) -> MissionResult<Vec<Fields>>;

    /// Overwrite every non-system field of an existing record.
    async fn replace(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()>;
}

#[async_trait]
impl<S: EntityStore + ?Sized> EntityStore for Arc<S> {
    async fn insert(&self, collection: Collection, fields: Fields) -> MissionResult<String> {
        (**self).insert(collection, fields).await
    }

    async fn patch(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        (**self).patch(collection, id, fields).await
    }

    async fn get(&self, collection: Collection, id: &str) -> MissionResult<Option<Fields>> {
        (**self).get(collection, id).await
    }

    async fn scan(&self, query: &ScanQuery) -> MissionResult<Vec<Fields>> {
        (**self).scan(query).await
    }

    async fn replace(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        (**self).replace(collection, id, fields).await
    }
}

#[async_trait]
impl<S: EntityStore + ?Sized> EntityStore for Box<S> {
    async fn insert(&self, collection: Collection, fields: Fields) -> MissionResult<String> {
        (**self).insert(collection, fields).await
    }

    async fn patch(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        (**self).patch(collection, id, fields).await
    }

    async fn get(&self, collection: Collection, id: &str) -> MissionResult<Option<Fields>> {
        (**self).get(collection, id).await
    }

    async fn scan(&self, query: &ScanQuery) -> MissionResult<Vec<Fields>> {
        (**self).scan(query).await
    }

    async fn replace(&self, collection: Collection, id: &str, fields: Fields) -> MissionResult<()> {
        (**self).replace(collection, id, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scan_query_builder() {
        let query = ScanQuery::eq(Collection::Tasks, schema::BY_STATUS, "inbox")
            .order(Order::Desc)
            .limit(5);
        assert_eq!(query.collection, Collection::Tasks);
        assert_eq!(
            query.index,
            Some(IndexRange {
                name: "by_status".to_string(),
                eq: Some(json!("inbox")),
            })
        );
        assert_eq!(query.order, Order::Desc);
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_scan_query_wire_shape() {
        let query = ScanQuery::all(Collection::Activities)
            .with_index(schema::BY_TIMESTAMP, None)
            .order(Order::Desc)
            .limit(20);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "collection": "activities",
                "index": {"name": "by_timestamp"},
                "order": "desc",
                "limit": 20,
            })
        );
    }
}
