//! Read-only analytics report over a user's tasks, sessions and stats.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ProductivityLevel, UserStats};
use crate::session::{DayTotal, FocusSession, SessionStore};
use crate::task::Task;

const WEEKS_IN_MONTH_VIEW: i64 = 4;

/// Hours in one of the trailing weeks, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekTotal {
    pub week: String,
    pub hours: f64,
}

/// How planned task durations are spread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationMix {
    /// Under 30 minutes.
    pub short: usize,
    /// 30 to 60 minutes.
    pub medium: usize,
    /// Over 60 minutes.
    pub long: usize,
}

impl DurationMix {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut mix, t| {
            match t.duration {
                0..=29 => mix.short += 1,
                30..=60 => mix.medium += 1,
                _ => mix.long += 1,
            }
            mix
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub by_day: Vec<DayTotal>,
    pub by_week: Vec<WeekTotal>,
    pub total_focus_hours: f64,
    pub session_count: usize,
    pub average_session_hours: f64,
    /// Day label of the longest single session.
    pub best_day: Option<String>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Share of listed tasks that are done, 0-100.
    pub completion_rate: f64,
    /// Mean of the completion rate and the stored productivity score.
    pub blended_score: u32,
    pub level: ProductivityLevel,
    pub average_task_minutes: Option<f64>,
    pub duration_mix: DurationMix,
}

impl AnalyticsReport {
    pub fn build(
        tasks: &[Task],
        sessions: &SessionStore,
        stats: &UserStats,
        now: DateTime<Utc>,
    ) -> Self {
        let session_count = sessions.len();
        let total_focus_hours = sessions.total_hours();
        let average_session_hours = if session_count > 0 {
            total_focus_hours / session_count as f64
        } else {
            0.0
        };

        // First session wins on ties.
        let best_day = sessions
            .list()
            .iter()
            .fold(None, |best: Option<&FocusSession>, s| match best {
                Some(b) if b.hours >= s.hours => Some(b),
                _ => Some(s),
            })
            .map(|s| s.day.clone());

        let total_tasks = tasks.len();
        let completed_tasks = tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total_tasks > 0 {
            completed_tasks as f64 / total_tasks as f64 * 100.0
        } else {
            0.0
        };
        let blended_score =
            ((completion_rate + f64::from(stats.productivity_score())) / 2.0).round() as u32;
        let average_task_minutes = (total_tasks > 0).then(|| {
            tasks.iter().map(|t| f64::from(t.duration)).sum::<f64>() / total_tasks as f64
        });

        Self {
            by_day: sessions.hours_by_day(),
            by_week: trailing_weeks(sessions, now),
            total_focus_hours,
            session_count,
            average_session_hours,
            best_day,
            total_tasks,
            completed_tasks,
            completion_rate,
            blended_score,
            level: ProductivityLevel::from_score(blended_score),
            average_task_minutes,
            duration_mix: DurationMix::from_tasks(tasks),
        }
    }
}

fn trailing_weeks(sessions: &SessionStore, now: DateTime<Utc>) -> Vec<WeekTotal> {
    (0..WEEKS_IN_MONTH_VIEW)
        .map(|i| {
            let start = now - Duration::days(7 * (WEEKS_IN_MONTH_VIEW - i));
            let end = start + Duration::days(7);
            // The current week closes at `now` itself, matching `hours_since`.
            let last = i + 1 == WEEKS_IN_MONTH_VIEW;
            let hours = sessions
                .list()
                .iter()
                .filter(|s| {
                    s.timestamp >= start && (s.timestamp < end || (last && s.timestamp == end))
                })
                .map(|s| s.hours)
                .sum();
            WeekTotal {
                week: format!("Week {}", i + 1),
                hours,
            }
        })
        .collect()
}
