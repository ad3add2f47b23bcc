use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// Every timer state change produces an Event.
/// The tracker consumes `FocusCompleted`; the CLI prints the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Countdown began from a full interval.
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown continued from where it was paused.
    TimerResumed {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: TimerMode,
        to: TimerMode,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    /// A focus interval ran down to zero.
    FocusCompleted {
        duration_min: u32,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        task_label: Option<String>,
        focus_intervals: u32,
        next_mode: TimerMode,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    /// A break ran down to zero and the cycle moved on. Not a completion.
    ModeChanged {
        from: TimerMode,
        to: TimerMode,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        mode_label: String,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        focus_intervals: u32,
        task_label: Option<String>,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_focus_completed(&self) -> bool {
        matches!(self, Event::FocusCompleted { .. })
    }
}
