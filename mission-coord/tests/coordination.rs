//! End-to-end behaviour of the coordination API against the in-memory store.

use chrono::Duration;
use mission_coord::{Coordinator, DEFAULT_ACTIVITY_LIMIT};
use mission_core::{
    AgentStatus, AgentStatusUpdate, DocumentType, MissionError, NewAgent, NewDocument,
    NewMessage, NewTask, NotFoundError, Task, TaskAssignment, TaskId, TaskStatus, TaskUpdate,
    ValidationError,
};
use mission_test_utils::{memory_store_with, monday_morning, ManualClock, MemoryStore};

fn setup() -> (Coordinator<MemoryStore, ManualClock>, ManualClock) {
    let clock = ManualClock::at_monday_morning();
    let store = memory_store_with(&clock);
    (Coordinator::new(store, clock.clone()), clock)
}

// ============================================================================
// CREATE / GET
// ============================================================================

#[tokio::test]
async fn test_created_task_reads_back_with_defaults() {
    let (coord, _) = setup();
    let id = coord
        .create_task(NewTask::new("Write report", "Quarterly numbers"))
        .await
        .unwrap();

    let task = coord.get_task(&id).await.unwrap().unwrap();
    assert_eq!(task.id, id);
    assert_eq!(task.title, "Write report");
    assert_eq!(task.description, "Quarterly numbers");
    assert_eq!(task.status, TaskStatus::Inbox);
    assert!(task.assignee_ids.is_empty());
    assert_eq!(task.creation_time, monday_morning());
}

#[tokio::test]
async fn test_created_agent_reads_back() {
    let (coord, _) = setup();
    let id = coord
        .create_agent(NewAgent::new("Friday", "Developer").with_session_key("sess-1"))
        .await
        .unwrap();
    let agent = coord.get_agent(&id).await.unwrap().unwrap();
    assert_eq!(agent.name, "Friday");
    assert_eq!(agent.role, "Developer");
    assert_eq!(agent.status, AgentStatus::Idle);
    assert_eq!(agent.session_key.as_deref(), Some("sess-1"));
    assert_eq!(agent.current_task_id, None);
}

#[tokio::test]
async fn test_blank_title_is_validation_error() {
    let (coord, _) = setup();
    let err = coord.create_task(NewTask::new("  ", "")).await.unwrap_err();
    assert_eq!(
        err,
        MissionError::Validation(ValidationError::RequiredFieldMissing {
            field: "title".to_string(),
        })
    );
}

#[tokio::test]
async fn test_duplicate_agent_name_rejected() {
    let (coord, _) = setup();
    coord.create_agent(NewAgent::new("Jarvis", "Lead")).await.unwrap();
    let err = coord
        .create_agent(NewAgent::new("Jarvis", "Other"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MissionError::Validation(ValidationError::DuplicateName { ref name }) if name == "Jarvis"
    ));
    assert_eq!(coord.list_agents().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_agent_name_lookups() {
    let (coord, _) = setup();
    let id = coord.create_agent(NewAgent::new("Jarvis", "Lead")).await.unwrap();

    assert_eq!(coord.get_agent_by_name("Jarvis").await.unwrap().map(|a| a.id), Some(id.clone()));
    assert!(coord.get_agent_by_name("jarvis").await.unwrap().is_none());
    assert_eq!(coord.find_agent_by_name("JARVIS").await.unwrap().id, id);
    assert!(coord.find_agent_by_name("Vision").await.unwrap_err().is_not_found());
}

// ============================================================================
// PARTIAL MERGE
// ============================================================================

#[tokio::test]
async fn test_task_update_is_partial() {
    let (coord, _) = setup();
    let id = coord
        .create_task(NewTask::new("Title", "Keep me"))
        .await
        .unwrap();

    coord
        .update_task(&id, TaskUpdate::status(TaskStatus::InProgress))
        .await
        .unwrap();
    let task = coord.get_task(&id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.title, "Title");
    assert_eq!(task.description, "Keep me");

    coord
        .update_task(
            &id,
            TaskUpdate {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let task = coord.get_task(&id).await.unwrap().unwrap();
    assert_eq!(task.title, "Renamed");
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn test_any_status_transition_allowed() {
    let (coord, _) = setup();
    let id = coord.create_task(NewTask::new("t", "")).await.unwrap();
    for status in [TaskStatus::Done, TaskStatus::Inbox, TaskStatus::Review, TaskStatus::Assigned] {
        coord.update_task(&id, TaskUpdate::status(status)).await.unwrap();
        assert_eq!(coord.get_task(&id).await.unwrap().unwrap().status, status);
    }
}

#[tokio::test]
async fn test_update_missing_task_is_not_found() {
    let (coord, _) = setup();
    let err = coord
        .update_task(&TaskId::new("missing"), TaskUpdate::status(TaskStatus::Done))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_agent_status_keeps_current_task_unless_given() {
    let (coord, _) = setup();
    let agent_id = coord.create_agent(NewAgent::new("Friday", "Dev")).await.unwrap();
    let task_id = coord.create_task(NewTask::new("t", "")).await.unwrap();

    coord
        .update_agent_status(
            &agent_id,
            AgentStatusUpdate::new(AgentStatus::Active).with_current_task(task_id.clone()),
        )
        .await
        .unwrap();
    coord
        .update_agent_status(&agent_id, AgentStatusUpdate::new(AgentStatus::Blocked))
        .await
        .unwrap();

    let agent = coord.get_agent(&agent_id).await.unwrap().unwrap();
    assert_eq!(agent.status, AgentStatus::Blocked);
    assert_eq!(agent.current_task_id, Some(task_id));
    assert_eq!(agent.name, "Friday");
}

#[tokio::test]
async fn test_agent_status_with_missing_task_fails() {
    let (coord, _) = setup();
    let agent_id = coord.create_agent(NewAgent::new("Friday", "Dev")).await.unwrap();
    let err = coord
        .update_agent_status(
            &agent_id,
            AgentStatusUpdate::new(AgentStatus::Active).with_current_task(TaskId::new("nope")),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    let agent = coord.get_agent(&agent_id).await.unwrap().unwrap();
    assert_eq!(agent.status, AgentStatus::Idle);
}

// ============================================================================
// ASSIGNMENT
// ============================================================================

#[tokio::test]
async fn test_assign_forces_assigned_even_from_done() {
    let (coord, _) = setup();
    let agent = coord.create_agent(NewAgent::new("Friday", "Dev")).await.unwrap();
    let task = coord
        .create_task(NewTask::new("t", "").with_status(TaskStatus::Done))
        .await
        .unwrap();

    coord
        .assign_task(&task, TaskAssignment::new([agent.clone()]))
        .await
        .unwrap();
    let stored = coord.get_task(&task).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Assigned);
    assert_eq!(stored.assignee_ids, vec![agent.clone()]);

    coord
        .update_task(&task, TaskUpdate::status(TaskStatus::Done))
        .await
        .unwrap();
    coord
        .assign_task(&task, TaskAssignment::new([agent.clone()]))
        .await
        .unwrap();
    let stored = coord.get_task(&task).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Assigned);
    assert_eq!(stored.assignee_ids, vec![agent]);
}

#[tokio::test]
async fn test_assign_preserves_order() {
    let (coord, _) = setup();
    let a = coord.create_agent(NewAgent::new("A", "r")).await.unwrap();
    let b = coord.create_agent(NewAgent::new("B", "r")).await.unwrap();
    let task = coord.create_task(NewTask::new("t", "")).await.unwrap();

    coord
        .assign_task(&task, TaskAssignment::new([b.clone(), a.clone()]))
        .await
        .unwrap();
    let stored = coord.get_task(&task).await.unwrap().unwrap();
    assert_eq!(stored.assignee_ids, vec![b, a]);
}

#[tokio::test]
async fn test_assign_unknown_agent_writes_nothing() {
    let (coord, _) = setup();
    let task = coord.create_task(NewTask::new("t", "")).await.unwrap();
    let err = coord
        .assign_task(&task, TaskAssignment::new([mission_core::AgentId::new("ghost")]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    let stored = coord.get_task(&task).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Inbox);
    assert!(stored.assignee_ids.is_empty());
}

#[tokio::test]
async fn test_empty_assignment_clears_and_sets_assigned() {
    let (coord, _) = setup();
    let agent = coord.create_agent(NewAgent::new("A", "r")).await.unwrap();
    let task = coord.create_task(NewTask::new("t", "")).await.unwrap();
    coord.assign_task(&task, TaskAssignment::new([agent])).await.unwrap();
    coord
        .update_task(&task, TaskUpdate::status(TaskStatus::Review))
        .await
        .unwrap();

    coord.assign_task(&task, TaskAssignment::default()).await.unwrap();
    let stored = coord.get_task(&task).await.unwrap().unwrap();
    assert!(stored.assignee_ids.is_empty());
    assert_eq!(stored.status, TaskStatus::Assigned);
}

#[tokio::test]
async fn test_list_tasks_by_status() {
    let (coord, _) = setup();
    coord.create_task(NewTask::new("a", "")).await.unwrap();
    coord
        .create_task(NewTask::new("b", "").with_status(TaskStatus::Done))
        .await
        .unwrap();
    coord.create_task(NewTask::new("c", "")).await.unwrap();

    let inbox: Vec<String> = coord
        .list_tasks(Some(TaskStatus::Inbox))
        .await
        .unwrap()
        .into_iter()
        .map(|t: Task| t.title)
        .collect();
    assert_eq!(inbox, vec!["a", "c"]);
    assert_eq!(coord.list_tasks(None).await.unwrap().len(), 3);
}

// ============================================================================
// MESSAGES / DOCUMENTS
// ============================================================================

#[tokio::test]
async fn test_messages_listed_oldest_first_per_task() {
    let (coord, clock) = setup();
    let agent = coord.create_agent(NewAgent::new("A", "r")).await.unwrap();
    let t1 = coord.create_task(NewTask::new("t1", "")).await.unwrap();
    let t2 = coord.create_task(NewTask::new("t2", "")).await.unwrap();

    for (task, content) in [(&t1, "first"), (&t2, "other"), (&t1, "second")] {
        clock.advance(Duration::seconds(1));
        coord
            .post_message(NewMessage {
                task_id: task.clone(),
                from_agent_id: agent.clone(),
                content: content.to_string(),
                attachments: None,
            })
            .await
            .unwrap();
    }

    let contents: Vec<String> = coord
        .list_messages(&t1)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(contents, vec!["first", "second"]);
}

#[tokio::test]
async fn test_message_requires_existing_task_and_agent() {
    let (coord, _) = setup();
    let agent = coord.create_agent(NewAgent::new("A", "r")).await.unwrap();
    let err = coord
        .post_message(NewMessage {
            task_id: TaskId::new("nope"),
            from_agent_id: agent,
            content: "hi".to_string(),
            attachments: Some(vec!["a.txt".to_string()]),
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_documents_with_and_without_task() {
    let (coord, _) = setup();
    let task = coord.create_task(NewTask::new("t", "")).await.unwrap();
    let attached = coord
        .create_document(NewDocument {
            title: "Findings".to_string(),
            content: "...".to_string(),
            doc_type: DocumentType::Research,
            task_id: Some(task.clone()),
        })
        .await
        .unwrap();
    coord
        .create_document(NewDocument {
            title: "Runbook".to_string(),
            content: "...".to_string(),
            doc_type: DocumentType::Protocol,
            task_id: None,
        })
        .await
        .unwrap();

    let for_task = coord.list_documents(Some(&task)).await.unwrap();
    assert_eq!(for_task.len(), 1);
    assert_eq!(for_task[0].id, attached);
    assert_eq!(coord.list_documents(None).await.unwrap().len(), 2);

    let doc = coord.get_document(&attached).await.unwrap().unwrap();
    assert_eq!(doc.doc_type, DocumentType::Research);
}

#[tokio::test]
async fn test_document_with_missing_task_fails() {
    let (coord, _) = setup();
    let err = coord
        .create_document(NewDocument {
            title: "x".to_string(),
            content: "y".to_string(),
            doc_type: DocumentType::Deliverable,
            task_id: Some(TaskId::new("ghost")),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MissionError::NotFound(NotFoundError::Record { .. })));
}

// ============================================================================
// ACTIVITIES
// ============================================================================

#[tokio::test]
async fn test_activity_feed_default_bound_newest_first() {
    let (coord, clock) = setup();
    for i in 0..25 {
        clock.advance(Duration::minutes(1));
        coord
            .log_activity("note", &format!("event {i}"), None)
            .await
            .unwrap();
    }

    let feed = coord.recent_activities(None).await.unwrap();
    assert_eq!(feed.len(), DEFAULT_ACTIVITY_LIMIT);
    assert_eq!(feed[0].message, "event 24");
    assert!(feed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let few = coord.recent_activities(Some(3)).await.unwrap();
    let messages: Vec<&str> = few.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(messages, vec!["event 24", "event 23", "event 22"]);
}

#[tokio::test]
async fn test_activity_timestamp_from_clock() {
    let (coord, clock) = setup();
    clock.advance(Duration::hours(3));
    let agent = coord.create_agent(NewAgent::new("A", "r")).await.unwrap();
    coord
        .log_activity("deploy", "shipped", Some(agent.clone()))
        .await
        .unwrap();
    let feed = coord.recent_activities(None).await.unwrap();
    assert_eq!(feed[0].timestamp, monday_morning() + Duration::hours(3));
    assert_eq!(feed[0].agent_id, Some(agent));
    assert_eq!(feed[0].activity_type, "deploy");
}
