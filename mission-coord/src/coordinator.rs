//! The coordination API: one operation per (entity, verb) pair.

use crate::resolve::{resolve_agent_name, resolve_suffix};
use mission_core::{
    delivered_patch, enabled_patch, Activity, ActivityId, Agent, AgentId, AgentStatusUpdate,
    CalendarEntry, CalendarEntryId, CalendarRunUpdate, Clock, Collection, Document, DocumentId,
    Message, MessageId, MissionError, MissionResult, NewActivity, NewAgent, NewCalendarEntry,
    NewDocument, NewMessage, NewNotification, NewTask, NotFoundError, Notification,
    NotificationId, Record, RecordIdType, Task, TaskAssignment, TaskId, TaskStatus, TaskUpdate,
    Timestamp, ValidationError,
};
use mission_schedule::{RecurrenceExpr, ScheduleZone};
use mission_storage::schema::{
    BY_AGENT, BY_DELIVERED, BY_NAME, BY_STATUS, BY_TASK, BY_TIMESTAMP, BY_TITLE,
};
use mission_storage::{get_record, insert_record, scan_records, EntityStore, Order, ScanQuery};

/// Number of activities returned by [`Coordinator::recent_activities`] without a limit.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 20;

/// Result of a natural-key upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub id: CalendarEntryId,
    /// `true` when no entry with the title existed.
    pub created: bool,
}

/// Coordination API over an [`EntityStore`].
///
/// Each operation is a short sequence of store calls. Operations that read
/// and then write (reference checks, upsert by title, assignment) are not
/// atomic: a concurrent writer can interleave between the read and the write.
pub struct Coordinator<S, C> {
    store: S,
    clock: C,
    zone: ScheduleZone,
}

impl<S, C> Coordinator<S, C>
where
    S: EntityStore,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            zone: ScheduleZone::Utc,
        }
    }

    /// Zone used to read recurrence expressions when recomputing `nextRunAt`.
    pub fn with_schedule_zone(mut self, zone: ScheduleZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn schedule_zone(&self) -> ScheduleZone {
        self.zone
    }

    // ========================================================================
    // SHARED HELPERS
    // ========================================================================

    async fn require<R: Record>(&self, id: &str) -> MissionResult<R> {
        get_record::<R, _>(&self.store, id)
            .await?
            .ok_or_else(|| MissionError::record_not_found(R::COLLECTION, id))
    }

    async fn all<R: Record>(&self) -> MissionResult<Vec<R>> {
        scan_records(&self.store, &ScanQuery::all(R::COLLECTION)).await
    }

    /// Resolve a full identifier or trailing fragment among every record of `R`.
    pub async fn resolve<R: Record>(&self, fragment: &str) -> MissionResult<R> {
        let candidates = self.all::<R>().await?;
        resolve_suffix(fragment, &candidates).cloned()
    }

    // ========================================================================
    // AGENTS
    // ========================================================================

    /// Register an agent. A second agent with exactly the same name is rejected.
    pub async fn create_agent(&self, agent: NewAgent) -> MissionResult<AgentId> {
        require_text("name", &agent.name)?;
        if self.get_agent_by_name(&agent.name).await?.is_some() {
            return Err(ValidationError::DuplicateName { name: agent.name }.into());
        }
        let id = AgentId::new(insert_record(&self.store, Collection::Agents, &agent).await?);
        tracing::info!(agent_id = %id, name = %agent.name, "Agent created");
        Ok(id)
    }

    pub async fn list_agents(&self) -> MissionResult<Vec<Agent>> {
        self.all().await
    }

    pub async fn get_agent(&self, id: &AgentId) -> MissionResult<Option<Agent>> {
        get_record(&self.store, id.as_str()).await
    }

    /// Exact, case-sensitive name lookup; the first agent in creation order wins.
    pub async fn get_agent_by_name(&self, name: &str) -> MissionResult<Option<Agent>> {
        let query = ScanQuery::eq(Collection::Agents, BY_NAME, name).limit(1);
        let agents: Vec<Agent> = scan_records(&self.store, &query).await?;
        Ok(agents.into_iter().next())
    }

    /// Case-insensitive name lookup used for human-typed agent names.
    pub async fn find_agent_by_name(&self, name: &str) -> MissionResult<Agent> {
        let agents = self.list_agents().await?;
        resolve_agent_name(name, &agents).cloned()
    }

    /// Set an agent's status, and its current task when one is given.
    pub async fn update_agent_status(
        &self,
        id: &AgentId,
        update: AgentStatusUpdate,
    ) -> MissionResult<()> {
        self.require::<Agent>(id.as_str()).await?;
        if let Some(task_id) = &update.current_task_id {
            self.require::<Task>(task_id.as_str()).await?;
        }
        let status = update.status;
        self.store
            .patch(Collection::Agents, id.as_str(), update.into_patch())
            .await?;
        tracing::info!(agent_id = %id, %status, "Agent status updated");
        Ok(())
    }

    // ========================================================================
    // TASKS
    // ========================================================================

    pub async fn create_task(&self, task: NewTask) -> MissionResult<TaskId> {
        require_text("title", &task.title)?;
        for agent_id in &task.assignee_ids {
            self.require::<Agent>(agent_id.as_str()).await?;
        }
        let id = TaskId::new(insert_record(&self.store, Collection::Tasks, &task).await?);
        tracing::info!(task_id = %id, status = %task.status, "Task created");
        Ok(id)
    }

    /// All tasks, or only those with `status`, oldest first.
    pub async fn list_tasks(&self, status: Option<TaskStatus>) -> MissionResult<Vec<Task>> {
        let query = match status {
            Some(status) => ScanQuery::eq(Collection::Tasks, BY_STATUS, status.as_db_str()),
            None => ScanQuery::all(Collection::Tasks),
        };
        scan_records(&self.store, &query).await
    }

    pub async fn get_task(&self, id: &TaskId) -> MissionResult<Option<Task>> {
        get_record(&self.store, id.as_str()).await
    }

    /// Apply the fields set in `update`; unset fields keep their stored value.
    pub async fn update_task(&self, id: &TaskId, update: TaskUpdate) -> MissionResult<()> {
        self.require::<Task>(id.as_str()).await?;
        if update.is_empty() {
            return Ok(());
        }
        let status = update.status;
        self.store
            .patch(Collection::Tasks, id.as_str(), update.into_patch())
            .await?;
        tracing::info!(task_id = %id, status = ?status, "Task updated");
        Ok(())
    }

    /// Replace the assignee set and move the task to `assigned`, whatever its
    /// previous status. An empty set clears the assignees but still sets
    /// `assigned`.
    pub async fn assign_task(&self, id: &TaskId, assignment: TaskAssignment) -> MissionResult<()> {
        self.require::<Task>(id.as_str()).await?;
        for agent_id in assignment.assignee_ids() {
            self.require::<Agent>(agent_id.as_str()).await?;
        }
        let assignees = assignment.assignee_ids().len();
        self.store
            .patch(Collection::Tasks, id.as_str(), assignment.into_patch())
            .await?;
        tracing::info!(task_id = %id, assignees, "Task assigned");
        Ok(())
    }

    // ========================================================================
    // MESSAGES
    // ========================================================================

    pub async fn post_message(&self, message: NewMessage) -> MissionResult<MessageId> {
        require_text("content", &message.content)?;
        self.require::<Task>(message.task_id.as_str()).await?;
        self.require::<Agent>(message.from_agent_id.as_str()).await?;
        let id = MessageId::new(insert_record(&self.store, Collection::Messages, &message).await?);
        tracing::info!(
            message_id = %id,
            task_id = %message.task_id,
            from = %message.from_agent_id,
            "Message posted"
        );
        Ok(id)
    }

    /// Messages on a task, oldest first.
    pub async fn list_messages(&self, task_id: &TaskId) -> MissionResult<Vec<Message>> {
        let query = ScanQuery::eq(Collection::Messages, BY_TASK, task_id.clone());
        scan_records(&self.store, &query).await
    }

    // ========================================================================
    // ACTIVITIES
    // ========================================================================

    /// Append to the activity feed, stamped with the current time.
    pub async fn log_activity(
        &self,
        activity_type: &str,
        message: &str,
        agent_id: Option<AgentId>,
    ) -> MissionResult<ActivityId> {
        require_text("type", activity_type)?;
        require_text("message", message)?;
        if let Some(agent_id) = &agent_id {
            self.require::<Agent>(agent_id.as_str()).await?;
        }
        let activity = NewActivity {
            activity_type: activity_type.to_string(),
            agent_id,
            message: message.to_string(),
            timestamp: self.clock.now(),
        };
        let id = ActivityId::new(
            insert_record(&self.store, Collection::Activities, &activity).await?,
        );
        tracing::info!(activity_id = %id, activity_type, "Activity logged");
        Ok(id)
    }

    /// Newest activities first, at most `limit` (default [`DEFAULT_ACTIVITY_LIMIT`]).
    pub async fn recent_activities(&self, limit: Option<usize>) -> MissionResult<Vec<Activity>> {
        let query = ScanQuery::all(Collection::Activities)
            .with_index(BY_TIMESTAMP, None)
            .order(Order::Desc)
            .limit(limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT));
        scan_records(&self.store, &query).await
    }

    // ========================================================================
    // DOCUMENTS
    // ========================================================================

    pub async fn create_document(&self, document: NewDocument) -> MissionResult<DocumentId> {
        require_text("title", &document.title)?;
        if let Some(task_id) = &document.task_id {
            self.require::<Task>(task_id.as_str()).await?;
        }
        let id = DocumentId::new(
            insert_record(&self.store, Collection::Documents, &document).await?,
        );
        tracing::info!(document_id = %id, doc_type = %document.doc_type, "Document created");
        Ok(id)
    }

    pub async fn get_document(&self, id: &DocumentId) -> MissionResult<Option<Document>> {
        get_record(&self.store, id.as_str()).await
    }

    /// Documents attached to `task_id`, or every document.
    pub async fn list_documents(&self, task_id: Option<&TaskId>) -> MissionResult<Vec<Document>> {
        let query = match task_id {
            Some(task_id) => ScanQuery::eq(Collection::Documents, BY_TASK, task_id.clone()),
            None => ScanQuery::all(Collection::Documents),
        };
        scan_records(&self.store, &query).await
    }

    // ========================================================================
    // NOTIFICATIONS
    // ========================================================================

    /// Queue an undelivered notification for an agent.
    pub async fn notify(&self, agent_id: &AgentId, content: &str) -> MissionResult<NotificationId> {
        require_text("content", content)?;
        self.require::<Agent>(agent_id.as_str()).await?;
        let notification = NewNotification {
            mentioned_agent_id: agent_id.clone(),
            content: content.to_string(),
            delivered: false,
            created_at: self.clock.now(),
        };
        let id = NotificationId::new(
            insert_record(&self.store, Collection::Notifications, &notification).await?,
        );
        tracing::info!(notification_id = %id, agent_id = %agent_id, "Notification queued");
        Ok(id)
    }

    /// Undelivered notifications, optionally only those for one agent.
    pub async fn list_undelivered(
        &self,
        agent_id: Option<&AgentId>,
    ) -> MissionResult<Vec<Notification>> {
        match agent_id {
            Some(agent_id) => {
                let query = ScanQuery::eq(Collection::Notifications, BY_AGENT, agent_id.clone());
                let notifications: Vec<Notification> = scan_records(&self.store, &query).await?;
                Ok(notifications.into_iter().filter(|n| !n.delivered).collect())
            }
            None => {
                let query = ScanQuery::eq(Collection::Notifications, BY_DELIVERED, false);
                scan_records(&self.store, &query).await
            }
        }
    }

    /// Mark a notification delivered. Already-delivered notifications are left as is.
    pub async fn mark_delivered(&self, id: &NotificationId) -> MissionResult<()> {
        let notification: Notification = self.require(id.as_str()).await?;
        if notification.delivered {
            tracing::debug!(notification_id = %id, "Notification already delivered");
            return Ok(());
        }
        self.store
            .patch(Collection::Notifications, id.as_str(), delivered_patch())
            .await?;
        tracing::info!(notification_id = %id, "Notification delivered");
        Ok(())
    }

    /// Resolve a fragment among undelivered notifications only.
    pub async fn resolve_undelivered(&self, fragment: &str) -> MissionResult<Notification> {
        let pending = self.list_undelivered(None).await?;
        resolve_suffix(fragment, &pending).cloned()
    }

    // ========================================================================
    // CALENDAR
    // ========================================================================

    pub async fn create_calendar_entry(
        &self,
        entry: NewCalendarEntry,
    ) -> MissionResult<CalendarEntryId> {
        validate_calendar_entry(&entry)?;
        let id = CalendarEntryId::new(
            insert_record(&self.store, Collection::Calendar, &entry).await?,
        );
        tracing::info!(calendar_entry_id = %id, title = %entry.title, "Calendar entry created");
        Ok(id)
    }

    pub async fn get_calendar_entry(&self, id: &CalendarEntryId) -> MissionResult<Option<CalendarEntry>> {
        get_record(&self.store, id.as_str()).await
    }

    /// Every entry, sorted by its human-readable schedule text ignoring case.
    pub async fn list_calendar(&self) -> MissionResult<Vec<CalendarEntry>> {
        let mut entries: Vec<CalendarEntry> = self.all().await?;
        entries.sort_by(|a, b| schedule_order(&a.schedule, &b.schedule));
        Ok(entries)
    }

    /// Flip `enabled`, returning the new value.
    pub async fn toggle_calendar_entry(&self, id: &CalendarEntryId) -> MissionResult<bool> {
        let entry: CalendarEntry = self.require(id.as_str()).await?;
        let enabled = !entry.enabled;
        self.store
            .patch(Collection::Calendar, id.as_str(), enabled_patch(enabled))
            .await?;
        tracing::info!(calendar_entry_id = %id, enabled, "Calendar entry toggled");
        Ok(enabled)
    }

    /// Create or fully overwrite the entry with `entry.title`.
    ///
    /// Lookup and write are separate store calls: two concurrent first
    /// upserts of the same title can both create.
    pub async fn upsert_calendar_entry(&self, entry: NewCalendarEntry) -> MissionResult<Upserted> {
        validate_calendar_entry(&entry)?;
        let query = ScanQuery::eq(Collection::Calendar, BY_TITLE, entry.title.as_str()).limit(1);
        let existing: Vec<CalendarEntry> = scan_records(&self.store, &query).await?;

        match existing.into_iter().next() {
            Some(found) => {
                let fields = mission_core::to_fields(&entry)?;
                self.store
                    .replace(Collection::Calendar, found.id.as_str(), fields)
                    .await?;
                tracing::info!(calendar_entry_id = %found.id, title = %entry.title, "Calendar entry replaced");
                Ok(Upserted {
                    id: found.id,
                    created: false,
                })
            }
            None => {
                let id = self.create_calendar_entry(entry).await?;
                Ok(Upserted { id, created: true })
            }
        }
    }

    /// Find an entry by exact title.
    pub async fn find_calendar_entry(&self, title: &str) -> MissionResult<CalendarEntry> {
        let query = ScanQuery::eq(Collection::Calendar, BY_TITLE, title).limit(1);
        let entries: Vec<CalendarEntry> = scan_records(&self.store, &query).await?;
        entries.into_iter().next().ok_or_else(|| {
            NotFoundError::CalendarTitle {
                title: title.to_string(),
            }
            .into()
        })
    }

    /// Record that an entry ran now and recompute its next run.
    pub async fn record_calendar_run(&self, id: &CalendarEntryId) -> MissionResult<CalendarEntry> {
        let entry: CalendarEntry = self.require(id.as_str()).await?;
        let expr = RecurrenceExpr::parse(&entry.cron_expr)?;
        let now = self.clock.now();
        let update = CalendarRunUpdate {
            last_run_at: now,
            next_run_at: self.zone.next_run(&expr, now),
        };
        self.store
            .patch(Collection::Calendar, id.as_str(), update.into_patch())
            .await?;
        tracing::info!(calendar_entry_id = %id, "Calendar run recorded");
        self.require(id.as_str()).await
    }

    /// Next occurrence of `expr` after now, in the coordinator's schedule zone.
    pub fn next_run(&self, expr: &str) -> MissionResult<Timestamp> {
        Ok(mission_schedule::next_occurrence(expr, self.clock.now(), self.zone)?)
    }
}

/// Case-insensitive order, with byte order breaking ties between case variants.
fn schedule_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn require_text(field: &str, value: &str) -> MissionResult<()> {
    if value.trim().is_empty() {
        return Err(MissionError::required(field));
    }
    Ok(())
}

fn validate_calendar_entry(entry: &NewCalendarEntry) -> MissionResult<()> {
    require_text("title", &entry.title)?;
    RecurrenceExpr::parse(&entry.cron_expr)?;
    Ok(())
}
