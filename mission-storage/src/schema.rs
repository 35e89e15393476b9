//! Declared secondary indexes per collection.

use mission_core::{Collection, StoreError};

pub const BY_NAME: &str = "by_name";
pub const BY_STATUS: &str = "by_status";
pub const BY_TASK: &str = "by_task";
pub const BY_TIMESTAMP: &str = "by_timestamp";
pub const BY_AGENT: &str = "by_agent";
pub const BY_DELIVERED: &str = "by_delivered";
pub const BY_TITLE: &str = "by_title";

/// A single-field equality/ordering index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub collection: Collection,
    pub name: &'static str,
    /// Document field the index is keyed on (camelCase wire name).
    pub field: &'static str,
}

pub const INDEXES: &[IndexDef] = &[
    IndexDef { collection: Collection::Agents, name: BY_NAME, field: "name" },
    IndexDef { collection: Collection::Tasks, name: BY_STATUS, field: "status" },
    IndexDef { collection: Collection::Messages, name: BY_TASK, field: "taskId" },
    IndexDef { collection: Collection::Activities, name: BY_TIMESTAMP, field: "timestamp" },
    IndexDef { collection: Collection::Documents, name: BY_TASK, field: "taskId" },
    IndexDef { collection: Collection::Notifications, name: BY_AGENT, field: "mentionedAgentId" },
    IndexDef { collection: Collection::Notifications, name: BY_DELIVERED, field: "delivered" },
    IndexDef { collection: Collection::Calendar, name: BY_TITLE, field: "title" },
];

/// Indexes declared on a collection.
pub fn indexes_for(collection: Collection) -> impl Iterator<Item = &'static IndexDef> {
    INDEXES.iter().filter(move |def| def.collection == collection)
}

/// Resolve an index name to the field it covers.
pub fn index_field(collection: Collection, name: &str) -> Result<&'static str, StoreError> {
    indexes_for(collection)
        .find(|def| def.name == name)
        .map(|def| def.field)
        .ok_or_else(|| StoreError::UnknownIndex {
            collection,
            index: name.to_string(),
        })
}
