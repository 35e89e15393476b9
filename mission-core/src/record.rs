//! Record trait and the JSON document form records take at the store boundary.

use crate::{Collection, RecordIdType, StoreError, Timestamp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A stored record in its wire form: a JSON object with camelCase field names.
pub type Fields = serde_json::Map<String, Value>;

/// Store-assigned identifier field present on every stored document.
pub const ID_FIELD: &str = "_id";

/// Store-assigned creation time (integer milliseconds) present on every stored document.
pub const CREATION_TIME_FIELD: &str = "_creationTime";

/// Whether a field name is reserved for the store.
pub fn is_system_field(name: &str) -> bool {
    name == ID_FIELD || name == CREATION_TIME_FIELD
}

/// A typed record kind backed by one store collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection this record kind is stored in.
    const COLLECTION: Collection;

    /// Typed identifier for this record kind.
    type Id: RecordIdType;

    /// Store-assigned identifier.
    fn id(&self) -> &Self::Id;

    /// Store-assigned creation time.
    fn creation_time(&self) -> Timestamp;
}

/// Serialize an insert payload or patch into a [`Fields`] map.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization {
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

/// Decode a stored document into its typed record.
pub fn from_fields<R: Record>(doc: Fields) -> Result<R, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Corrupt {
        reason: format!("{} record: {}", R::COLLECTION, e),
    })
}

/// Read the `_id` of stored fields.
pub fn fields_id(doc: &Fields) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
