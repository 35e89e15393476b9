//! Typed helpers over the untyped store primitives.

use crate::{EntityStore, ScanQuery};
use mission_core::{from_fields, to_fields, Collection, MissionResult, Record};
use serde::Serialize;

/// Serialize `payload` and insert it, returning the new identifier.
pub async fn insert_record<S, T>(store: &S, collection: Collection, payload: &T) -> MissionResult<String>
where
    S: EntityStore + ?Sized,
    T: Serialize + Sync,
{
    let fields = to_fields(payload)?;
    store.insert(collection, fields).await
}

/// Fetch and decode one record.
pub async fn get_record<R, S>(store: &S, id: &str) -> MissionResult<Option<R>>
where
    R: Record,
    S: EntityStore + ?Sized,
{
    match store.get(R::COLLECTION, id).await? {
        Some(fields) => Ok(Some(from_fields(fields)?)),
        None => Ok(None),
    }
}

/// Scan and decode. The query's collection must belong to `R`.
pub async fn scan_records<R, S>(store: &S, query: &ScanQuery) -> MissionResult<Vec<R>>
where
    R: Record,
    S: EntityStore + ?Sized,
{
    debug_assert_eq!(query.collection, R::COLLECTION);
    let rows = store.scan(query).await?;
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(from_fields(row)?);
    }
    Ok(records)
}
