//! Mission Control Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - A settable clock for deterministic timestamps
//! - Proptest generators for enums, identifiers and insert payloads
//! - Fixtures for common records

pub use mission_storage::MemoryStore;

pub use mission_core::{
    Agent, AgentId, AgentStatus, CalendarEntryType, Clock, DocumentType, NewAgent,
    NewCalendarEntry, NewTask, Task, TaskId, TaskStatus, Timestamp,
};

use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

// ============================================================================
// CLOCK
// ============================================================================

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Clock starting at [`monday_morning`].
    pub fn at_monday_morning() -> Self {
        Self::new(monday_morning())
    }

    pub fn set(&self, instant: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 2024-01-01T10:00:00Z, a Monday.
pub fn monday_morning() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Memory store stamping `_creationTime` from `clock`.
pub fn memory_store_with(clock: &ManualClock) -> MemoryStore {
    MemoryStore::with_clock(Arc::new(clock.clone()))
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Mission Control types.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
        prop::sample::select(TaskStatus::ALL.to_vec())
    }

    pub fn arb_agent_status() -> impl Strategy<Value = AgentStatus> {
        prop::sample::select(AgentStatus::ALL.to_vec())
    }

    pub fn arb_document_type() -> impl Strategy<Value = DocumentType> {
        prop::sample::select(DocumentType::ALL.to_vec())
    }

    pub fn arb_calendar_entry_type() -> impl Strategy<Value = CalendarEntryType> {
        prop_oneof![Just(CalendarEntryType::Cron), Just(CalendarEntryType::Task)]
    }

    /// Identifier in the local stores' format: 32 lowercase hex characters.
    pub fn arb_record_id() -> impl Strategy<Value = String> {
        "[0-9a-f]{32}"
    }

    /// Non-blank human text.
    pub fn arb_text() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,24}"
    }

    /// Instant between 2000 and 2100 at millisecond precision.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (946_684_800_000i64..4_102_444_800_000i64)
            .prop_map(|ms| Utc.timestamp_millis_opt(ms).single().unwrap_or_default())
    }

    /// Recurrence expression in the supported subset.
    pub fn arb_cron_expr() -> impl Strategy<Value = String> {
        (0u32..60, 0u32..24, proptest::option::of(0u32..7)).prop_map(|(m, h, dow)| {
            let dow = dow.map_or_else(|| "*".to_string(), |d| d.to_string());
            format!("{m} {h} * * {dow}")
        })
    }

    pub fn arb_new_task() -> impl Strategy<Value = NewTask> {
        (arb_text(), "[a-z ]{0,40}", arb_task_status()).prop_map(|(title, description, status)| {
            NewTask::new(title, description).with_status(status)
        })
    }

    pub fn arb_new_calendar_entry() -> impl Strategy<Value = NewCalendarEntry> {
        (
            arb_text(),
            "[a-z ]{0,40}",
            arb_cron_expr(),
            any::<bool>(),
            arb_calendar_entry_type(),
        )
            .prop_map(|(title, description, cron_expr, enabled, entry_type)| NewCalendarEntry {
                title,
                description,
                schedule: format!("at {cron_expr}"),
                cron_expr,
                enabled,
                entry_type,
                next_run_at: None,
                last_run_at: None,
                agent_id: "Jarvis".to_string(),
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common scenarios.

    use super::*;
    use mission_core::new_record_id;

    /// A stored-looking agent with a fresh identifier.
    pub fn make_agent(name: &str) -> Agent {
        Agent {
            id: AgentId::new(new_record_id()),
            creation_time: monday_morning(),
            name: name.to_string(),
            role: "Tester".to_string(),
            status: AgentStatus::Idle,
            current_task_id: None,
            session_key: None,
        }
    }

    /// A stored-looking task with a fresh identifier and no assignees.
    pub fn make_task(title: &str, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(new_record_id()),
            creation_time: monday_morning(),
            title: title.to_string(),
            description: String::new(),
            status,
            assignee_ids: Vec::new(),
        }
    }

    /// Enabled cron entry with the given title and expression.
    pub fn calendar_entry(title: &str, cron_expr: &str) -> NewCalendarEntry {
        NewCalendarEntry {
            title: title.to_string(),
            description: format!("{title} job"),
            schedule: cron_expr.to_string(),
            cron_expr: cron_expr.to_string(),
            enabled: true,
            entry_type: CalendarEntryType::Cron,
            next_run_at: None,
            last_run_at: None,
            agent_id: "Jarvis".to_string(),
        }
    }

    /// A nightly and a weekly job, as a fresh install is usually seeded.
    pub fn nightly_and_weekly() -> Vec<NewCalendarEntry> {
        let mut nightly = calendar_entry("Receipt Queue", "0 1 * * *");
        nightly.schedule = "Daily at 01:00".to_string();
        let mut weekly = calendar_entry("Time Report Reminder", "0 14 * * 5");
        weekly.schedule = "Fridays at 14:00".to_string();
        vec![nightly, weekly]
    }
}
