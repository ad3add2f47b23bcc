use serde::{Deserialize, Serialize};

use super::mode::TimerMode;
use crate::error::ValidationError;

/// User-editable pomodoro cycle settings. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_min")]
    pub focus_min: u32,
    #[serde(default = "default_short_break_min")]
    pub short_break_min: u32,
    #[serde(default = "default_long_break_min")]
    pub long_break_min: u32,
    #[serde(default = "default_intervals_before_long_break")]
    pub intervals_before_long_break: u32,
    #[serde(default = "default_true")]
    pub auto_start_next: bool,
}

fn default_focus_min() -> u32 {
    25
}
fn default_short_break_min() -> u32 {
    5
}
fn default_long_break_min() -> u32 {
    15
}
fn default_intervals_before_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_min: default_focus_min(),
            short_break_min: default_short_break_min(),
            long_break_min: default_long_break_min(),
            intervals_before_long_break: default_intervals_before_long_break(),
            auto_start_next: true,
        }
    }
}

impl TimerConfig {
    /// Reject zero durations and a zero long-break cadence.
    ///
    /// # Errors
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("focus_min", self.focus_min),
            ("short_break_min", self.short_break_min),
            ("long_break_min", self.long_break_min),
            ("intervals_before_long_break", self.intervals_before_long_break),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ValidationError::NotPositive {
                    field,
                    value: value as f64,
                });
            }
        }
        Ok(())
    }

    pub fn duration_min(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_min,
            TimerMode::ShortBreak => self.short_break_min,
            TimerMode::LongBreak => self.long_break_min,
        }
    }

    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        u64::from(self.duration_min(mode)).saturating_mul(60)
    }
}
