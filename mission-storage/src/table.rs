//! In-process table set shared by the memory and file backends.

use crate::schema::index_field;
use crate::{Order, ScanQuery};
use mission_core::{
    fields_id, is_system_field, new_record_id, Collection, Fields, MissionError, MissionResult,
    StoreError, Timestamp, ValidationError, CREATION_TIME_FIELD, ID_FIELD,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// All collections, each holding its records in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Tables {
    collections: BTreeMap<Collection, Vec<Fields>>,
}

impl Tables {
    pub(crate) fn insert(
        &mut self,
        collection: Collection,
        fields: Fields,
        now: Timestamp,
    ) -> MissionResult<String> {
        reject_system_fields(&fields)?;
        let id = new_record_id();
        let mut record = Fields::new();
        record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        record.insert(
            CREATION_TIME_FIELD.to_string(),
            Value::from(now.timestamp_millis()),
        );
        record.extend(fields.into_iter().filter(|(_, v)| !v.is_null()));
        self.collections.entry(collection).or_default().push(record);
        Ok(id)
    }

    pub(crate) fn patch(
        &mut self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> MissionResult<()> {
        reject_system_fields(&fields)?;
        let record = self
            .find_mut(collection, id)
            .ok_or_else(|| MissionError::record_not_found(collection, id))?;
        for (key, value) in fields {
            if value.is_null() {
                record.remove(&key);
            } else {
                record.insert(key, value);
            }
        }
        Ok(())
    }

    pub(crate) fn replace(
        &mut self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> MissionResult<()> {
        reject_system_fields(&fields)?;
        let record = self
            .find_mut(collection, id)
            .ok_or_else(|| MissionError::record_not_found(collection, id))?;
        record.retain(|key, _| is_system_field(key));
        record.extend(fields.into_iter().filter(|(_, v)| !v.is_null()));
        Ok(())
    }

    pub(crate) fn get(&self, collection: Collection, id: &str) -> Option<Fields> {
        self.collections
            .get(&collection)?
            .iter()
            .find(|record| fields_id(record) == Some(id))
            .cloned()
    }

    pub(crate) fn scan(&self, query: &ScanQuery) -> Result<Vec<Fields>, StoreError> {
        let rows: &[Fields] = self
            .collections
            .get(&query.collection)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let sort_field = query
            .index
            .as_ref()
            .map(|range| index_field(query.collection, &range.name))
            .transpose()?;
        let eq = query.index.as_ref().and_then(|range| range.eq.as_ref());

        let mut selected: Vec<&Fields> = match (sort_field, eq) {
            (Some(field), Some(eq)) => rows
                .iter()
                .filter(|row| row.get(field).unwrap_or(&Value::Null) == eq)
                .collect(),
            _ => rows.iter().collect(),
        };

        match (sort_field, query.order) {
            (None, Order::Asc) => {}
            (None, Order::Desc) => selected.reverse(),
            (Some(field), Order::Asc) => {
                selected.sort_by(|a, b| compare_values(a.get(field), b.get(field)));
            }
            (Some(field), Order::Desc) => {
                selected.reverse();
                selected.sort_by(|a, b| compare_values(b.get(field), a.get(field)));
            }
        }

        if let Some(limit) = query.limit {
            selected.truncate(limit);
        }
        Ok(selected.into_iter().cloned().collect())
    }

    fn find_mut(&mut self, collection: Collection, id: &str) -> Option<&mut Fields> {
        self.collections
            .get_mut(&collection)?
            .iter_mut()
            .find(|record| fields_id(record) == Some(id))
    }
}

fn reject_system_fields(fields: &Fields) -> MissionResult<()> {
    match fields.keys().find(|key| is_system_field(key)) {
        Some(key) => Err(ValidationError::InvalidValue {
            field: key.clone(),
            value: fields.get(key).map(Value::to_string).unwrap_or_default(),
            reason: "system fields are assigned by the store".to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Total order over JSON values: missing/null, booleans, numbers, strings, then the rest.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BY_STATUS, BY_TIMESTAMP};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_assigns_system_fields_and_drops_nulls() {
        let mut tables = Tables::default();
        let id = tables
            .insert(
                Collection::Agents,
                fields(json!({"name": "Jarvis", "sessionKey": null})),
                now(),
            )
            .unwrap();
        let record = tables.get(Collection::Agents, &id).unwrap();
        assert_eq!(record.get("_id"), Some(&json!(id)));
        assert_eq!(record.get("_creationTime"), Some(&json!(now().timestamp_millis())));
        assert!(!record.contains_key("sessionKey"));
    }

    #[test]
    fn test_insert_rejects_system_fields() {
        let mut tables = Tables::default();
        let err = tables
            .insert(Collection::Agents, fields(json!({"_id": "x"})), now())
            .unwrap_err();
        assert!(matches!(err, MissionError::Validation(_)));
    }

    #[test]
    fn test_get_is_collection_scoped() {
        let mut tables = Tables::default();
        let id = tables
            .insert(Collection::Tasks, fields(json!({"title": "t"})), now())
            .unwrap();
        assert!(tables.get(Collection::Agents, &id).is_none());
        assert!(tables.get(Collection::Tasks, &id).is_some());
    }

    #[test]
    fn test_patch_merges_and_null_clears() {
        let mut tables = Tables::default();
        let id = tables
            .insert(
                Collection::Agents,
                fields(json!({"name": "A", "status": "idle", "currentTaskId": "t1"})),
                now(),
            )
            .unwrap();
        tables
            .patch(
                Collection::Agents,
                &id,
                fields(json!({"status": "active", "currentTaskId": null})),
            )
            .unwrap();
        let record = tables.get(Collection::Agents, &id).unwrap();
        assert_eq!(record.get("status"), Some(&json!("active")));
        assert_eq!(record.get("name"), Some(&json!("A")));
        assert!(!record.contains_key("currentTaskId"));
    }

    #[test]
    fn test_patch_missing_is_not_found() {
        let mut tables = Tables::default();
        let err = tables
            .patch(Collection::Tasks, "nope", fields(json!({"title": "x"})))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_replace_keeps_system_fields_only() {
        let mut tables = Tables::default();
        let id = tables
            .insert(
                Collection::Calendar,
                fields(json!({"title": "T", "description": "old", "lastRunAt": 5})),
                now(),
            )
            .unwrap();
        tables
            .replace(
                Collection::Calendar,
                &id,
                fields(json!({"title": "T", "description": "new"})),
            )
            .unwrap();
        let record = tables.get(Collection::Calendar, &id).unwrap();
        assert_eq!(record.get("description"), Some(&json!("new")));
        assert!(!record.contains_key("lastRunAt"));
        assert_eq!(record.get("_id"), Some(&json!(id)));
    }

    #[test]
    fn test_scan_filters_by_index_value() {
        let mut tables = Tables::default();
        for status in ["inbox", "done", "inbox"] {
            tables
                .insert(Collection::Tasks, fields(json!({"status": status})), now())
                .unwrap();
        }
        let rows = tables
            .scan(&ScanQuery::eq(Collection::Tasks, BY_STATUS, "inbox"))
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_scan_desc_by_index_breaks_ties_newest_first() {
        let mut tables = Tables::default();
        for (ts, label) in [(10, "a"), (30, "b"), (10, "c"), (20, "d")] {
            tables
                .insert(
                    Collection::Activities,
                    fields(json!({"timestamp": ts, "message": label})),
                    now(),
                )
                .unwrap();
        }
        let rows = tables
            .scan(
                &ScanQuery::all(Collection::Activities)
                    .with_index(BY_TIMESTAMP, None)
                    .order(Order::Desc)
                    .limit(3),
            )
            .unwrap();
        let messages: Vec<&Value> = rows.iter().map(|r| &r["message"]).collect();
        assert_eq!(messages, vec![&json!("b"), &json!("d"), &json!("c")]);
    }

    #[test]
    fn test_scan_unknown_index_fails() {
        let tables = Tables::default();
        let err = tables
            .scan(&ScanQuery::eq(Collection::Agents, "by_colour", "red"))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownIndex { .. }));
    }

    #[test]
    fn test_compare_values_orders_kinds() {
        assert_eq!(compare_values(None, Some(&json!(false))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!(1)), Some(&json!("1"))), Ordering::Less);
    }
}
