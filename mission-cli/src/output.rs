//! One-line renderings of records for terminal output.

use mission_core::{
    short_id, Activity, Agent, AgentId, CalendarEntry, Document, Message, Notification,
    RecordIdType, Task, Timestamp,
};

/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Display name for an agent id: its name when known, else the short id.
pub fn agent_label(id: &AgentId, agents: &[Agent]) -> String {
    agents
        .iter()
        .find(|a| &a.id == id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| id.short().to_string())
}

pub fn task_line(task: &Task) -> String {
    let assignees = match task.assignee_ids.len() {
        0 => String::new(),
        n => format!(" ({} assignee(s))", n),
    };
    format!("[{}] [{}] {}{}", task.id.short(), task.status, task.title, assignees)
}

pub fn agent_line(agent: &Agent) -> String {
    let task = agent
        .current_task_id
        .as_ref()
        .map(|t| format!(" -> task:{}", t.short()))
        .unwrap_or_default();
    format!(
        "[{}] [{}] {} - {}{}",
        agent.id.short(),
        agent.status,
        agent.name,
        agent.role,
        task
    )
}

pub fn message_line(message: &Message, agents: &[Agent]) -> String {
    let mut line = format!(
        "[{}] {}: {}",
        format_timestamp(message.creation_time),
        agent_label(&message.from_agent_id, agents),
        message.content
    );
    if let Some(attachments) = message.attachments.as_ref().filter(|a| !a.is_empty()) {
        line.push_str(&format!(" [attachments: {}]", attachments.join(", ")));
    }
    line
}

pub fn document_line(document: &Document) -> String {
    format!(
        "[{}] [{}] {}",
        document.id.short(),
        document.doc_type,
        document.title
    )
}

pub fn activity_line(activity: &Activity) -> String {
    format!(
        "[{}] [{}] {}",
        format_timestamp(activity.timestamp),
        activity.activity_type,
        activity.message
    )
}

pub fn notification_line(notification: &Notification, agents: &[Agent]) -> String {
    format!(
        "[{}] -> {}: {}",
        notification.id.short(),
        agent_label(&notification.mentioned_agent_id, agents),
        notification.content
    )
}

pub fn calendar_line(entry: &CalendarEntry) -> String {
    let state = if entry.enabled { "on" } else { "off" };
    let next = entry
        .next_run_at
        .map(|ts| format!(" next: {}", format_timestamp(ts)))
        .unwrap_or_default();
    format!(
        "[{}] [{}] {} | {} ({}) [{}]{}",
        entry.id.short(),
        state,
        entry.schedule,
        entry.title,
        entry.cron_expr,
        entry.agent_id,
        next
    )
}

/// `created <kind>: <id>`
pub fn created_line(kind: &str, id: &str) -> String {
    format!("created {}: {}", kind, id)
}

/// Bracketed short form of a raw identifier.
pub fn bracketed(id: &str) -> String {
    format!("[{}]", short_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mission_core::{CalendarEntryId, CalendarEntryType, TaskId, TaskStatus};

    fn agent(id: &str, name: &str) -> Agent {
        Agent {
            id: AgentId::new(id),
            creation_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            name: name.to_string(),
            role: "Lead".to_string(),
            status: mission_core::AgentStatus::Active,
            current_task_id: Some(TaskId::new("0000000011112222")),
            session_key: None,
        }
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(ts), "2024-03-09 07:05:01");
    }

    #[test]
    fn test_task_line_shows_short_id_and_assignees() {
        let task = Task {
            id: TaskId::new("aaaaaaaabbbbbbbb"),
            creation_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            title: "Ship it".to_string(),
            description: String::new(),
            status: TaskStatus::InProgress,
            assignee_ids: vec![AgentId::new("a1"), AgentId::new("a2")],
        };
        assert_eq!(task_line(&task), "[bbbbbbbb] [in_progress] Ship it (2 assignee(s))");
    }

    #[test]
    fn test_agent_line_includes_current_task() {
        let line = agent_line(&agent("ffffffff12345678", "Jarvis"));
        assert_eq!(line, "[12345678] [active] Jarvis - Lead -> task:11112222");
    }

    #[test]
    fn test_agent_label_falls_back_to_short_id() {
        let agents = vec![agent("a1", "Jarvis")];
        assert_eq!(agent_label(&AgentId::new("a1"), &agents), "Jarvis");
        assert_eq!(agent_label(&AgentId::new("zzzzzzzz99999999"), &agents), "99999999");
    }

    #[test]
    fn test_calendar_line() {
        let entry = CalendarEntry {
            id: CalendarEntryId::new("cccccccc00000001"),
            creation_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            title: "Receipt Queue".to_string(),
            description: String::new(),
            schedule: "Daily at 01:00".to_string(),
            cron_expr: "0 1 * * *".to_string(),
            enabled: false,
            entry_type: CalendarEntryType::Cron,
            next_run_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap()),
            last_run_at: None,
            agent_id: "Jarvis".to_string(),
        };
        assert_eq!(
            calendar_line(&entry),
            "[00000001] [off] Daily at 01:00 | Receipt Queue (0 1 * * *) [Jarvis] next: 2024-01-02 01:00:00"
        );
    }

    #[test]
    fn test_created_line() {
        assert_eq!(created_line("task", "abc"), "created task: abc");
        assert_eq!(bracketed("0123456789"), "[23456789]");
    }
}
