//! Core record structures and their insert payloads.
//!
//! Stored records carry the store-assigned `_id` and `_creationTime`; the
//! `New*` payloads carry only the caller-supplied fields.

use crate::{
    ActivityId, AgentId, AgentStatus, CalendarEntryId, CalendarEntryType, Collection, DocumentId,
    DocumentType, MessageId, NotificationId, Record, TaskId, TaskStatus, Timestamp,
};
use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use serde::{Deserialize, Serialize};

macro_rules! impl_record {
    ($type:ty, $collection:expr, $id:ty) => {
        impl Record for $type {
            const COLLECTION: Collection = $collection;
            type Id = $id;

            fn id(&self) -> &Self::Id {
                &self.id
            }

            fn creation_time(&self) -> Timestamp {
                self.creation_time
            }
        }
    };
}

// ============================================================================
// AGENT
// ============================================================================

/// An automated actor with a status and an optional current task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(rename = "_id")]
    pub id: AgentId,
    #[serde(rename = "_creationTime", with = "ts_milliseconds")]
    pub creation_time: Timestamp,
    /// Unique by convention; checked before insert, not by the store.
    pub name: String,
    pub role: String,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
}

impl_record!(Agent, Collection::Agents, AgentId);

/// Insert payload for [`Agent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    pub role: String,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
}

impl NewAgent {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            status: AgentStatus::default(),
            session_key: None,
        }
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }
}

// ============================================================================
// TASK
// ============================================================================

/// A unit of work with a status lifecycle and zero or more assignees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: TaskId,
    #[serde(rename = "_creationTime", with = "ts_milliseconds")]
    pub creation_time: Timestamp,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// Order-preserving set of assignees.
    #[serde(default)]
    pub assignee_ids: Vec<AgentId>,
}

impl_record!(Task, Collection::Tasks, TaskId);

/// Insert payload for [`Task`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee_ids: Vec<AgentId>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: TaskStatus::default(),
            assignee_ids: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignees(mut self, assignee_ids: Vec<AgentId>) -> Self {
        self.assignee_ids = assignee_ids;
        self
    }
}

// ============================================================================
// MESSAGE
// ============================================================================

/// A comment posted on a task by an agent. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: MessageId,
    #[serde(rename = "_creationTime", with = "ts_milliseconds")]
    pub creation_time: Timestamp,
    pub task_id: TaskId,
    pub from_agent_id: AgentId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

impl_record!(Message, Collection::Messages, MessageId);

/// Insert payload for [`Message`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub task_id: TaskId,
    pub from_agent_id: AgentId,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

// ============================================================================
// ACTIVITY
// ============================================================================

/// An entry in the append-only activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "_id")]
    pub id: ActivityId,
    #[serde(rename = "_creationTime", with = "ts_milliseconds")]
    pub creation_time: Timestamp,
    /// Free-form label such as "task_created" or "deploy".
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub message: String,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: Timestamp,
}

impl_record!(Activity, Collection::Activities, ActivityId);

/// Insert payload for [`Activity`]. The timestamp comes from the clock at insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub message: String,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: Timestamp,
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// A document produced by an agent, optionally attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_creationTime", with = "ts_milliseconds")]
    pub creation_time: Timestamp,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
}

impl_record!(Document, Collection::Documents, DocumentId);

/// Insert payload for [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
}

// ============================================================================
// NOTIFICATION
// ============================================================================

/// A pulled notification for a mentioned agent. `delivered` only flips false to true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: NotificationId,
    #[serde(rename = "_creationTime", with = "ts_milliseconds")]
    pub creation_time: Timestamp,
    pub mentioned_agent_id: AgentId,
    pub content: String,
    pub delivered: bool,
    #[serde(with = "ts_milliseconds")]
    pub created_at: Timestamp,
}

impl_record!(Notification, Collection::Notifications, NotificationId);

/// Insert payload for [`Notification`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub mentioned_agent_id: AgentId,
    pub content: String,
    pub delivered: bool,
    #[serde(with = "ts_milliseconds")]
    pub created_at: Timestamp,
}

// ============================================================================
// CALENDAR ENTRY
// ============================================================================

/// A scheduled job or reminder. `title` is the natural key for upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    #[serde(rename = "_id")]
    pub id: CalendarEntryId,
    #[serde(rename = "_creationTime", with = "ts_milliseconds")]
    pub creation_time: Timestamp,
    pub title: String,
    pub description: String,
    /// Human-readable schedule, e.g. "Fridays at 14:00".
    pub schedule: String,
    /// 5-field recurrence expression.
    pub cron_expr: String,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub entry_type: CalendarEntryType,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub next_run_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub last_run_at: Option<Timestamp>,
    /// Free-text owner label, not a reference.
    pub agent_id: String,
}

impl_record!(CalendarEntry, Collection::Calendar, CalendarEntryId);

impl CalendarEntry {
    /// The caller-supplied fields of this entry.
    pub fn fields(&self) -> NewCalendarEntry {
        NewCalendarEntry {
            title: self.title.clone(),
            description: self.description.clone(),
            schedule: self.schedule.clone(),
            cron_expr: self.cron_expr.clone(),
            enabled: self.enabled,
            entry_type: self.entry_type,
            next_run_at: self.next_run_at,
            last_run_at: self.last_run_at,
            agent_id: self.agent_id.clone(),
        }
    }
}

/// Full field set of a [`CalendarEntry`], used for both create and upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEntry {
    pub title: String,
    pub description: String,
    pub schedule: String,
    pub cron_expr: String,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub entry_type: CalendarEntryType,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub next_run_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub last_run_at: Option<Timestamp>,
    pub agent_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_fields, to_fields};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_task_wire_format_is_camel_case() {
        let task = Task {
            id: TaskId::new("t1"),
            creation_time: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            title: "Write report".to_string(),
            description: String::new(),
            status: TaskStatus::InProgress,
            assignee_ids: vec![AgentId::new("a1")],
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({
                "_id": "t1",
                "_creationTime": 1_700_000_000_000i64,
                "title": "Write report",
                "description": "",
                "status": "in_progress",
                "assigneeIds": ["a1"],
            })
        );
    }

    #[test]
    fn test_agent_optional_fields_absent_when_none() {
        let payload = NewAgent::new("Jarvis", "Squad lead");
        let doc = to_fields(&payload).unwrap();
        assert!(!doc.contains_key("sessionKey"));
        assert_eq!(doc.get("status"), Some(&json!("idle")));
    }

    #[test]
    fn test_calendar_entry_decodes_optional_timestamps() {
        let doc = to_fields(&json!({
            "_id": "c1",
            "_creationTime": 1_000,
            "title": "Nightly",
            "description": "d",
            "schedule": "Daily at 01:00",
            "cronExpr": "0 1 * * *",
            "enabled": true,
            "type": "cron",
            "nextRunAt": 86_400_000i64,
            "agentId": "Jarvis",
        }))
        .unwrap();
        let entry: CalendarEntry = from_fields(doc).unwrap();
        assert_eq!(entry.next_run_at, Some(Utc.timestamp_millis_opt(86_400_000).unwrap()));
        assert_eq!(entry.last_run_at, None);
        assert_eq!(entry.entry_type, CalendarEntryType::Cron);
        assert_eq!(entry.fields().title, "Nightly");
    }

    #[test]
    fn test_decode_rejects_unknown_enum_value() {
        let doc = to_fields(&json!({
            "_id": "d1",
            "_creationTime": 1,
            "title": "x",
            "content": "y",
            "type": "memo",
        }))
        .unwrap();
        assert!(from_fields::<Document>(doc).is_err());
    }
}
