//! Append-only log of focus sessions for one user.
//!
//! Sessions are labelled with the UTC weekday of their timestamp. Day
//! aggregation, goal windows and the streak are all derived from the log.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

pub const DEFAULT_SESSION_LABEL: &str = "Focus Session";

/// Weekday labels in display order.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    /// Weekday abbreviation, `Mon`..`Sun`.
    pub day: String,
    pub hours: f64,
    pub task: String,
    pub timestamp: DateTime<Utc>,
}

impl FocusSession {
    /// Build a session from a duration in minutes. An empty label becomes
    /// [`DEFAULT_SESSION_LABEL`].
    pub fn from_minutes(minutes: f64, task: Option<&str>, at: DateTime<Utc>) -> Self {
        let task = task
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SESSION_LABEL);
        Self {
            day: day_label(at),
            hours: minutes / 60.0,
            task: task.to_string(),
            timestamp: at,
        }
    }
}

/// Hours logged on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotal {
    pub day: String,
    pub hours: f64,
}

pub fn day_label(at: DateTime<Utc>) -> String {
    weekday_label(at.weekday()).to_string()
}

fn weekday_label(day: Weekday) -> &'static str {
    WEEKDAY_LABELS[day.num_days_from_monday() as usize]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionStore {
    sessions: Vec<FocusSession>,
}

impl SessionStore {
    pub fn new(sessions: Vec<FocusSession>) -> Self {
        Self { sessions }
    }

    /// Append a session. Negative or non-finite hours are ignored.
    pub fn append(&mut self, session: FocusSession) -> Option<&FocusSession> {
        if !session.hours.is_finite() || session.hours < 0.0 {
            warn!(hours = session.hours, "ignoring session with invalid hours");
            return None;
        }
        self.sessions.push(session);
        self.sessions.last()
    }

    pub fn list(&self) -> &[FocusSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn total_hours(&self) -> f64 {
        self.sessions.iter().map(|s| s.hours).sum()
    }

    /// Hours per weekday label, Monday first, zero-filled.
    pub fn hours_by_day(&self) -> Vec<DayTotal> {
        WEEKDAY_LABELS
            .iter()
            .map(|day| DayTotal {
                day: day.to_string(),
                hours: self.hours_on(day),
            })
            .collect()
    }

    pub fn hours_on(&self, day: &str) -> f64 {
        self.sessions
            .iter()
            .filter(|s| s.day == day)
            .map(|s| s.hours)
            .sum()
    }

    /// Hours logged at or after `since`.
    pub fn hours_since(&self, since: DateTime<Utc>) -> f64 {
        self.sessions
            .iter()
            .filter(|s| s.timestamp >= since)
            .map(|s| s.hours)
            .sum()
    }

    /// Distinct calendar dates (UTC) with at least one session.
    pub fn active_days(&self) -> u32 {
        self.dates().len() as u32
    }

    /// Consecutive days with a session, counting back from `today`.
    ///
    /// A streak is still alive if the last session was yesterday; it breaks
    /// once a whole day passes without one.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let dates = self.dates();
        let mut day = if dates.contains(&today) {
            today
        } else {
            today - Duration::days(1)
        };
        let mut streak = 0;
        while dates.contains(&day) {
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    fn dates(&self) -> BTreeSet<NaiveDate> {
        self.sessions.iter().map(|s| s.timestamp.date_naive()).collect()
    }
}
