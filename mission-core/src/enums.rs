//! Enum types for Mission Control records

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// COLLECTIONS
// ============================================================================

/// Record kind discriminator. Each kind lives in its own store collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Agents,
    Tasks,
    Messages,
    Activities,
    Documents,
    Notifications,
    Calendar,
}

impl Collection {
    /// Every collection, in schema order.
    pub const ALL: [Collection; 7] = [
        Collection::Agents,
        Collection::Tasks,
        Collection::Messages,
        Collection::Activities,
        Collection::Documents,
        Collection::Notifications,
        Collection::Calendar,
    ];

    /// Wire name of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Agents => "agents",
            Collection::Tasks => "tasks",
            Collection::Messages => "messages",
            Collection::Activities => "activities",
            Collection::Documents => "documents",
            Collection::Notifications => "notifications",
            Collection::Calendar => "calendar",
        }
    }

    /// Singular human label used in messages ("task", "agent", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Agents => "agent",
            Collection::Tasks => "task",
            Collection::Messages => "message",
            Collection::Activities => "activity",
            Collection::Documents => "document",
            Collection::Notifications => "notification",
            Collection::Calendar => "calendar entry",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| invalid("collection", s, "unknown collection"))
    }
}

// ============================================================================
// AGENT STATUS
// ============================================================================

/// Status of an agent. Transitions are caller-directed and unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Registered but not working on anything
    #[default]
    Idle,
    /// Working on a task
    Active,
    /// Waiting on something outside its control
    Blocked,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 3] = [AgentStatus::Idle, AgentStatus::Active, AgentStatus::Blocked];

    /// Convert to stored string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Active => "active",
            AgentStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for AgentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(AgentStatus::Idle),
            "active" => Ok(AgentStatus::Active),
            "blocked" => Ok(AgentStatus::Blocked),
            _ => Err(invalid("status", s, "expected idle|active|blocked")),
        }
    }
}

// ============================================================================
// TASK STATUS
// ============================================================================

/// Lifecycle status of a task.
///
/// Any status may be set from any status through an update; only assignment
/// forces a particular value ([`TaskStatus::Assigned`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Inbox,
    Assigned,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Inbox,
        TaskStatus::Assigned,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    /// Convert to stored string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            TaskStatus::Inbox => "inbox",
            TaskStatus::Assigned => "assigned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(TaskStatus::Inbox),
            "assigned" => Ok(TaskStatus::Assigned),
            "in_progress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "done" => Ok(TaskStatus::Done),
            _ => Err(invalid(
                "status",
                s,
                "expected inbox|assigned|in_progress|review|done",
            )),
        }
    }
}

// ============================================================================
// DOCUMENT TYPE
// ============================================================================

/// Kind of document produced by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Deliverable,
    Research,
    Protocol,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Deliverable,
        DocumentType::Research,
        DocumentType::Protocol,
    ];

    pub fn as_db_str(&self) -> &'static str {
        match self {
            DocumentType::Deliverable => "deliverable",
            DocumentType::Research => "research",
            DocumentType::Protocol => "protocol",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for DocumentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deliverable" => Ok(DocumentType::Deliverable),
            "research" => Ok(DocumentType::Research),
            "protocol" => Ok(DocumentType::Protocol),
            _ => Err(invalid("type", s, "expected deliverable|research|protocol")),
        }
    }
}

// ============================================================================
// CALENDAR ENTRY TYPE
// ============================================================================

/// Whether a calendar entry is a recurring job or a one-off task reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEntryType {
    Cron,
    Task,
}

impl CalendarEntryType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            CalendarEntryType::Cron => "cron",
            CalendarEntryType::Task => "task",
        }
    }
}

impl fmt::Display for CalendarEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for CalendarEntryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cron" => Ok(CalendarEntryType::Cron),
            "task" => Ok(CalendarEntryType::Task),
            _ => Err(invalid("type", s, "expected cron|task")),
        }
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
