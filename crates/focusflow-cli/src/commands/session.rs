use chrono::Utc;
use clap::Subcommand;
use focusflow_core::Database;
use serde_json::json;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// List logged sessions, oldest first
    List {
        /// Only the most recent N sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Log focus time by hand
    Log {
        /// Minutes of focus
        minutes: f64,
        /// What the time was spent on
        #[arg(long)]
        task: Option<String>,
    },
    /// Total focus hours
    Total,
    /// Focus hours per weekday
    ByDay,
}

pub fn run(action: SessionAction) -> CmdResult {
    let mut db = Database::open()?;
    let mut tracker = open_tracker(&mut db)?;

    match action {
        SessionAction::List { limit } => {
            let sessions = tracker.sessions().list();
            let skip = limit.map_or(0, |n| sessions.len().saturating_sub(n));
            print_json(&sessions[skip..])?;
        }
        SessionAction::Log { minutes, task } => {
            let session = tracker
                .log_session(minutes, task.as_deref(), Utc::now())?
                .ok_or("session ignored: minutes must be a non-negative number")?;
            print_json(&session)?;
        }
        SessionAction::Total => {
            let sessions = tracker.sessions();
            print_json(&json!({
                "sessions": sessions.len(),
                "total_hours": sessions.total_hours(),
            }))?;
        }
        SessionAction::ByDay => {
            print_json(&tracker.sessions().hours_by_day())?;
        }
    }
    Ok(())
}
