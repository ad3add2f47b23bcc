//! Task management commands for CLI.

use clap::Subcommand;
use focusflow_core::{Database, NewTask, Priority, TaskUpdate};

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Planned duration in minutes
        #[arg(long, default_value = "25")]
        duration: u32,
        /// Schedule label, e.g. "Today" or "10:30 AM"
        #[arg(long)]
        time: Option<String>,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List tasks
    List {
        /// Only tasks not yet done
        #[arg(long, conflicts_with = "completed")]
        pending: bool,
        /// Only finished tasks
        #[arg(long)]
        completed: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags (replaces existing)
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip a task between done and not done
    Toggle {
        /// Task ID
        id: String,
    },
    /// Mark a task done
    Complete {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Delete every task
    Clear {
        /// Confirm deleting all tasks
        #[arg(long)]
        yes: bool,
    },
}

fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn not_found(id: &str) -> Box<dyn std::error::Error> {
    format!("task not found: {id}").into()
}

pub fn run(action: TaskAction) -> CmdResult {
    let mut db = Database::open()?;
    let mut tracker = open_tracker(&mut db)?;

    match action {
        TaskAction::Add {
            title,
            duration,
            time,
            priority,
            description,
            tags,
        } => {
            let task = tracker.add_task(NewTask {
                title,
                description,
                time,
                duration,
                priority,
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
            })?;
            print_json(&task)?;
        }
        TaskAction::List { pending, completed } => {
            let tasks: Vec<_> = tracker
                .tasks()
                .iter()
                .filter(|t| !pending || !t.completed)
                .filter(|t| !completed || t.completed)
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Get { id } => {
            let task = tracker.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(task)?;
        }
        TaskAction::Update {
            id,
            title,
            duration,
            time,
            priority,
            description,
            tags,
            completed,
        } => {
            let update = TaskUpdate {
                title,
                description,
                time,
                duration,
                priority,
                completed,
                tags: tags.as_deref().map(parse_tags),
            };
            let task = tracker
                .update_task(&id, update)?
                .ok_or_else(|| not_found(&id))?;
            print_json(&task)?;
        }
        TaskAction::Toggle { id } => {
            tracker.toggle_task(&id)?.ok_or_else(|| not_found(&id))?;
            print_json(tracker.task(&id).ok_or_else(|| not_found(&id))?)?;
        }
        TaskAction::Complete { id } => {
            tracker.complete_task(&id)?.ok_or_else(|| not_found(&id))?;
            print_json(tracker.task(&id).ok_or_else(|| not_found(&id))?)?;
        }
        TaskAction::Delete { id } => {
            if !tracker.delete_task(&id)? {
                return Err(not_found(&id));
            }
            println!("deleted {id}");
        }
        TaskAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear tasks without --yes".into());
            }
            tracker.clear_tasks()?;
            println!("tasks cleared");
        }
    }
    Ok(())
}
