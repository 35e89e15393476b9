//! Command surface of `mc` and the dispatcher that runs it.
//!
//! Identifier arguments accept a full identifier or any trailing fragment;
//! agent names match case-insensitively.

use crate::error::CliError;
use crate::output;
use crate::seed;
use clap::{Parser, Subcommand};
use mission_coord::Coordinator;
use mission_core::{
    Agent, AgentStatus, AgentStatusUpdate, CalendarEntry, CalendarEntryType, Clock, DocumentType,
    MissionError, MissionResult, NewAgent, NewCalendarEntry, NewDocument, NewMessage, NewTask,
    NotFoundError, Notification, RecordIdType, Task, TaskAssignment, TaskStatus, TaskUpdate,
    ValidationError,
};
use mission_storage::EntityStore;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mc", version, about = "Mission Control command-line client")]
pub struct Cli {
    /// Path to a TOML config file (default: $MC_CONFIG, then ./.mc-config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit log events as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Create a task in the inbox
    #[command(name = "task:create")]
    TaskCreate {
        title: String,
        description: Option<String>,
    },
    /// List tasks, optionally only those with a status
    #[command(name = "task:list")]
    TaskList { status: Option<String> },
    /// Set a task's status
    #[command(name = "task:update")]
    TaskUpdate { id: String, status: String },
    /// Assign a task to an agent
    #[command(name = "task:assign")]
    TaskAssign { id: String, agent: String },

    /// Post a message on a task (sender defaults to the first agent)
    #[command(name = "message:post")]
    MessagePost {
        task: String,
        content: String,
        agent: Option<String>,
    },
    /// List the messages on a task, oldest first
    #[command(name = "message:list")]
    MessageList { task: String },

    /// Create a document: deliverable, research or protocol
    #[command(name = "doc:create")]
    DocCreate {
        title: String,
        content: String,
        doc_type: String,
        task: Option<String>,
    },
    /// List documents, optionally only those attached to a task
    #[command(name = "doc:list")]
    DocList { task: Option<String> },

    /// Register an agent
    #[command(name = "agent:create")]
    AgentCreate { name: String, role: String },
    /// List agents
    #[command(name = "agent:list")]
    AgentList,
    /// Set an agent's status: idle, active or blocked
    #[command(name = "agent:status")]
    AgentStatus { name: String, status: String },

    /// Show the newest activities
    #[command(name = "activity:feed")]
    ActivityFeed { limit: Option<usize> },
    /// Append to the activity feed
    #[command(name = "activity:log")]
    ActivityLog {
        activity_type: String,
        message: String,
        agent: Option<String>,
    },

    /// Send a notification to an agent
    #[command(name = "notify")]
    Notify { agent: String, content: String },
    /// List undelivered notifications, optionally for one agent
    #[command(name = "notifications:list")]
    NotificationsList { agent: Option<String> },
    /// Mark an undelivered notification delivered
    #[command(name = "notifications:deliver")]
    NotificationsDeliver { id: String },

    /// List calendar entries by schedule
    #[command(name = "calendar:list")]
    CalendarList,
    /// Enable or disable a calendar entry
    #[command(name = "calendar:toggle")]
    CalendarToggle { id: String },
    /// Create or overwrite the calendar entry with a title
    #[command(name = "calendar:upsert")]
    CalendarUpsert {
        title: String,
        description: String,
        schedule: String,
        cron_expr: String,
        entry_type: String,
        agent_label: String,
        /// Store the entry disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Upsert every entry in a JSON seed file
    #[command(name = "calendar:seed")]
    CalendarSeed { file: PathBuf },
    /// Record that an entry ran now and compute its next run
    #[command(name = "calendar:run")]
    CalendarRun { id: String },
    /// Print the next occurrence of a recurrence expression
    #[command(name = "calendar:next")]
    CalendarNext { cron_expr: String },
}

/// Run one command against `coord`, writing human-readable output to `out`.
pub async fn execute<S, C, W>(
    command: Command,
    coord: &Coordinator<S, C>,
    out: &mut W,
) -> Result<(), CliError>
where
    S: EntityStore,
    C: Clock,
    W: Write,
{
    match command {
        // ====================================================================
        // TASKS
        // ====================================================================
        Command::TaskCreate { title, description } => {
            let id = coord
                .create_task(NewTask::new(title, description.unwrap_or_default()))
                .await?;
            writeln!(out, "{}", output::created_line("task", id.as_str()))?;
        }
        Command::TaskList { status } => {
            let status = status.map(|s| s.parse::<TaskStatus>()).transpose()?;
            let tasks = coord.list_tasks(status).await?;
            if tasks.is_empty() {
                writeln!(out, "No tasks found.")?;
            }
            for task in &tasks {
                writeln!(out, "{}", output::task_line(task))?;
            }
        }
        Command::TaskUpdate { id, status } => {
            let status: TaskStatus = status.parse()?;
            let task: Task = coord.resolve(&id).await?;
            coord.update_task(&task.id, TaskUpdate::status(status)).await?;
            writeln!(out, "updated task {}: {}", output::bracketed(task.id.as_str()), status)?;
        }
        Command::TaskAssign { id, agent } => {
            let task: Task = coord.resolve(&id).await?;
            let agent = coord.find_agent_by_name(&agent).await?;
            coord
                .assign_task(&task.id, TaskAssignment::new([agent.id.clone()]))
                .await?;
            writeln!(
                out,
                "assigned task {} to {}",
                output::bracketed(task.id.as_str()),
                agent.name
            )?;
        }

        // ====================================================================
        // MESSAGES
        // ====================================================================
        Command::MessagePost {
            task,
            content,
            agent,
        } => {
            let task: Task = coord.resolve(&task).await?;
            let sender = match agent {
                Some(name) => coord.find_agent_by_name(&name).await?,
                None => default_sender(coord).await?,
            };
            let id = coord
                .post_message(NewMessage {
                    task_id: task.id,
                    from_agent_id: sender.id,
                    content,
                    attachments: None,
                })
                .await?;
            writeln!(out, "{}", output::created_line("message", id.as_str()))?;
        }
        Command::MessageList { task } => {
            let task: Task = coord.resolve(&task).await?;
            let messages = coord.list_messages(&task.id).await?;
            if messages.is_empty() {
                writeln!(out, "No messages found.")?;
                return Ok(());
            }
            let agents = coord.list_agents().await?;
            for message in &messages {
                writeln!(out, "{}", output::message_line(message, &agents))?;
            }
        }

        // ====================================================================
        // DOCUMENTS
        // ====================================================================
        Command::DocCreate {
            title,
            content,
            doc_type,
            task,
        } => {
            let doc_type: DocumentType = doc_type.parse()?;
            let task_id = match task {
                Some(fragment) => {
                    optional_reference(coord.resolve::<Task>(&fragment).await)?.map(|t| t.id)
                }
                None => None,
            };
            let id = coord
                .create_document(NewDocument {
                    title,
                    content,
                    doc_type,
                    task_id,
                })
                .await?;
            writeln!(out, "{}", output::created_line("document", id.as_str()))?;
        }
        Command::DocList { task } => {
            let task_id = match task {
                Some(fragment) => Some(coord.resolve::<Task>(&fragment).await?.id),
                None => None,
            };
            let documents = coord.list_documents(task_id.as_ref()).await?;
            if documents.is_empty() {
                writeln!(out, "No documents found.")?;
            }
            for document in &documents {
                writeln!(out, "{}", output::document_line(document))?;
            }
        }

        // ====================================================================
        // AGENTS
        // ====================================================================
        Command::AgentCreate { name, role } => {
            let id = coord.create_agent(NewAgent::new(name, role)).await?;
            writeln!(out, "{}", output::created_line("agent", id.as_str()))?;
        }
        Command::AgentList => {
            let agents = coord.list_agents().await?;
            if agents.is_empty() {
                writeln!(out, "No agents found.")?;
            }
            for agent in &agents {
                writeln!(out, "{}", output::agent_line(agent))?;
            }
        }
        Command::AgentStatus { name, status } => {
            let status: AgentStatus = status.parse()?;
            let agent = coord.find_agent_by_name(&name).await?;
            coord
                .update_agent_status(&agent.id, AgentStatusUpdate::new(status))
                .await?;
            writeln!(out, "{} status: {}", agent.name, status)?;
        }

        // ====================================================================
        // ACTIVITIES
        // ====================================================================
        Command::ActivityFeed { limit } => {
            let activities = coord.recent_activities(limit).await?;
            if activities.is_empty() {
                writeln!(out, "No activities found.")?;
            }
            for activity in &activities {
                writeln!(out, "{}", output::activity_line(activity))?;
            }
        }
        Command::ActivityLog {
            activity_type,
            message,
            agent,
        } => {
            let agent_id = match agent {
                Some(name) => {
                    optional_reference(coord.find_agent_by_name(&name).await)?.map(|a| a.id)
                }
                None => None,
            };
            let id = coord.log_activity(&activity_type, &message, agent_id).await?;
            writeln!(out, "{}", output::created_line("activity", id.as_str()))?;
        }

        // ====================================================================
        // NOTIFICATIONS
        // ====================================================================
        Command::Notify { agent, content } => {
            let agent = coord.find_agent_by_name(&agent).await?;
            let id = coord.notify(&agent.id, &content).await?;
            writeln!(out, "{}", output::created_line("notification", id.as_str()))?;
        }
        Command::NotificationsList { agent } => {
            let agent_id = match agent {
                Some(name) => Some(coord.find_agent_by_name(&name).await?.id),
                None => None,
            };
            let notifications = coord.list_undelivered(agent_id.as_ref()).await?;
            if notifications.is_empty() {
                writeln!(out, "No undelivered notifications found.")?;
                return Ok(());
            }
            let agents = coord.list_agents().await?;
            for notification in &notifications {
                writeln!(out, "{}", output::notification_line(notification, &agents))?;
            }
        }
        Command::NotificationsDeliver { id } => {
            let notification: Notification = coord.resolve_undelivered(&id).await?;
            coord.mark_delivered(&notification.id).await?;
            writeln!(
                out,
                "delivered notification {}",
                output::bracketed(notification.id.as_str())
            )?;
        }

        // ====================================================================
        // CALENDAR
        // ====================================================================
        Command::CalendarList => {
            let entries = coord.list_calendar().await?;
            if entries.is_empty() {
                writeln!(out, "No calendar entries found.")?;
            }
            for entry in &entries {
                writeln!(out, "{}", output::calendar_line(entry))?;
            }
        }
        Command::CalendarToggle { id } => {
            let entry: CalendarEntry = coord.resolve(&id).await?;
            let enabled = coord.toggle_calendar_entry(&entry.id).await?;
            let state = if enabled { "enabled" } else { "disabled" };
            writeln!(
                out,
                "calendar entry {} {}",
                output::bracketed(entry.id.as_str()),
                state
            )?;
        }
        Command::CalendarUpsert {
            title,
            description,
            schedule,
            cron_expr,
            entry_type,
            agent_label,
            disabled,
        } => {
            let entry_type: CalendarEntryType = entry_type.parse()?;
            let upserted = coord
                .upsert_calendar_entry(NewCalendarEntry {
                    title,
                    description,
                    schedule,
                    cron_expr,
                    enabled: !disabled,
                    entry_type,
                    next_run_at: None,
                    last_run_at: None,
                    agent_id: agent_label,
                })
                .await?;
            if upserted.created {
                writeln!(out, "{}", output::created_line("calendar entry", upserted.id.as_str()))?;
            } else {
                writeln!(out, "updated calendar entry: {}", upserted.id)?;
            }
        }
        Command::CalendarSeed { file } => {
            let entries = seed::load_seed_file(&file)?;
            let report = seed::seed_calendar(coord, entries, out).await?;
            if !report.failed.is_empty() {
                return Err(CliError::SeedFailed {
                    failed: report.failed.len(),
                    total: report.total(),
                });
            }
        }
        Command::CalendarRun { id } => {
            let entry: CalendarEntry = coord.resolve(&id).await?;
            let entry = coord.record_calendar_run(&entry.id).await?;
            let next = entry
                .next_run_at
                .map(output::format_timestamp)
                .unwrap_or_else(|| "none".to_string());
            writeln!(
                out,
                "ran calendar entry {}; next run: {}",
                output::bracketed(entry.id.as_str()),
                next
            )?;
        }
        Command::CalendarNext { cron_expr } => {
            let next = coord.next_run(&cron_expr)?;
            writeln!(out, "{}", output::format_timestamp(next))?;
        }
    }
    Ok(())
}

/// An optional reference that names nothing is dropped rather than failing
/// the command. Ambiguous fragments and store errors still propagate.
fn optional_reference<T>(lookup: MissionResult<T>) -> MissionResult<Option<T>> {
    match lookup {
        Ok(found) => Ok(Some(found)),
        Err(MissionError::NotFound(
            err @ (NotFoundError::Fragment { .. } | NotFoundError::AgentName { .. }),
        )) => {
            tracing::warn!(error = %err, "Ignoring unresolved optional reference");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Sender used by `message:post` when no agent is named: the first agent.
async fn default_sender<S: EntityStore, C: Clock>(
    coord: &Coordinator<S, C>,
) -> Result<Agent, CliError> {
    coord
        .list_agents()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ValidationError::InvalidValue {
                field: "agent".to_string(),
                value: String::new(),
                reason: "no agents exist; create one with agent:create".to_string(),
            }
            .into()
        })
}
