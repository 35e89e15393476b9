//! Partial-update payloads.
//!
//! Each payload names exactly the fields it may change. A `None` field is left
//! untouched by the store; only fields that are set end up in the patch.

use crate::{AgentId, AgentStatus, Fields, TaskId, TaskStatus, Timestamp};
use serde_json::Value;

/// Update payload for tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New status
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    pub fn into_patch(self) -> Fields {
        let mut patch = Fields::new();
        if let Some(title) = self.title {
            patch.insert("title".into(), Value::String(title));
        }
        if let Some(description) = self.description {
            patch.insert("description".into(), Value::String(description));
        }
        if let Some(status) = self.status {
            patch.insert("status".into(), status.as_db_str().into());
        }
        patch
    }
}

/// Update payload for an agent's status.
///
/// `current_task_id` is only written when present; a status change never
/// clears or implies a current task.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStatusUpdate {
    pub status: AgentStatus,
    pub current_task_id: Option<TaskId>,
}

impl AgentStatusUpdate {
    pub fn new(status: AgentStatus) -> Self {
        Self {
            status,
            current_task_id: None,
        }
    }

    pub fn with_current_task(mut self, task_id: TaskId) -> Self {
        self.current_task_id = Some(task_id);
        self
    }

    pub fn into_patch(self) -> Fields {
        let mut patch = Fields::new();
        patch.insert("status".into(), self.status.as_db_str().into());
        if let Some(task_id) = self.current_task_id {
            patch.insert("currentTaskId".into(), task_id.into());
        }
        patch
    }
}

/// Replacement assignee set for a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskAssignment {
    assignee_ids: Vec<AgentId>,
}

impl TaskAssignment {
    /// Build an assignment, dropping repeated agents while keeping first-seen order.
    pub fn new(agent_ids: impl IntoIterator<Item = AgentId>) -> Self {
        let mut assignee_ids: Vec<AgentId> = Vec::new();
        for id in agent_ids {
            if !assignee_ids.contains(&id) {
                assignee_ids.push(id);
            }
        }
        Self { assignee_ids }
    }

    pub fn assignee_ids(&self) -> &[AgentId] {
        &self.assignee_ids
    }

    /// Every assignment forces the task into `assigned`, even an empty one.
    pub fn into_patch(self) -> Fields {
        let mut patch = Fields::new();
        patch.insert("status".into(), TaskStatus::Assigned.as_db_str().into());
        let ids: Vec<Value> = self.assignee_ids.into_iter().map(Value::from).collect();
        patch.insert("assigneeIds".into(), Value::Array(ids));
        patch
    }
}

/// Run bookkeeping for a calendar entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarRunUpdate {
    pub last_run_at: Timestamp,
    /// `None` clears a previously computed next run.
    pub next_run_at: Option<Timestamp>,
}

impl CalendarRunUpdate {
    pub fn into_patch(self) -> Fields {
        let mut patch = Fields::new();
        patch.insert(
            "lastRunAt".into(),
            self.last_run_at.timestamp_millis().into(),
        );
        patch.insert(
            "nextRunAt".into(),
            self.next_run_at
                .map(|t| Value::from(t.timestamp_millis()))
                .unwrap_or(Value::Null),
        );
        patch
    }
}

/// Patch flipping a notification to delivered.
pub fn delivered_patch() -> Fields {
    let mut patch = Fields::new();
    patch.insert("delivered".into(), Value::Bool(true));
    patch
}

/// Patch setting a calendar entry's enabled flag.
pub fn enabled_patch(enabled: bool) -> Fields {
    let mut patch = Fields::new();
    patch.insert("enabled".into(), Value::Bool(enabled));
    patch
}
