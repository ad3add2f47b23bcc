//! Derived user statistics.
//!
//! [`UserStats`] is only ever produced by [`UserStats::initial`] and
//! [`recompute`]. Events carry absolute observed totals rather than deltas,
//! so replaying an event is harmless and the productivity score can always
//! be rebuilt from the inputs.

mod analytics;

pub use analytics::{AnalyticsReport, DurationMix, WeekTotal};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::session::SessionStore;

/// Tasks needed for a full completion sub-score.
pub const TASKS_FOR_FULL_SCORE: f64 = 10.0;
/// Focus hours needed for a full focus sub-score.
pub const HOURS_FOR_FULL_SCORE: f64 = 50.0;
/// Sub-score points per streak day.
pub const POINTS_PER_STREAK_DAY: f64 = 10.0;

const COMPLETED_WEIGHT: f64 = 0.4;
const FOCUS_WEIGHT: f64 = 0.4;
const STREAK_WEIGHT: f64 = 0.2;

/// Goals assigned to new or reset users.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalDefaults {
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal: f64,
    #[serde(default = "default_monthly_goal")]
    pub monthly_goal: f64,
}

fn default_weekly_goal() -> f64 {
    20.0
}
fn default_monthly_goal() -> f64 {
    80.0
}

impl Default for GoalDefaults {
    fn default() -> Self {
        Self {
            weekly_goal: default_weekly_goal(),
            monthly_goal: default_monthly_goal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    total_focus_hours: f64,
    current_streak: u32,
    weekly_goal: f64,
    monthly_goal: f64,
    completed_tasks: u32,
    productivity_score: u32,
    last_active: DateTime<Utc>,
    #[serde(default)]
    daily_average: f64,
}

/// Something that changes the inputs of the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatsEvent {
    /// A focus session was logged; totals are read back from the session store.
    FocusSessionFinished {
        total_focus_hours: f64,
        current_streak: u32,
        active_days: u32,
    },
    TaskCompleted { completed_tasks: u32 },
    /// `None` keeps the current goal.
    GoalsUpdated {
        weekly_goal: Option<f64>,
        monthly_goal: Option<f64>,
    },
}

impl UserStats {
    /// Zeroed stats with the given goals.
    pub fn initial(goals: GoalDefaults, now: DateTime<Utc>) -> Self {
        Self {
            total_focus_hours: 0.0,
            current_streak: 0,
            weekly_goal: goals.weekly_goal,
            monthly_goal: goals.monthly_goal,
            completed_tasks: 0,
            productivity_score: 0,
            last_active: now,
            daily_average: 0.0,
        }
    }

    pub fn total_focus_hours(&self) -> f64 {
        self.total_focus_hours
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn weekly_goal(&self) -> f64 {
        self.weekly_goal
    }

    pub fn monthly_goal(&self) -> f64 {
        self.monthly_goal
    }

    pub fn completed_tasks(&self) -> u32 {
        self.completed_tasks
    }

    pub fn productivity_score(&self) -> u32 {
        self.productivity_score
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    pub fn daily_average(&self) -> f64 {
        self.daily_average
    }

    pub fn level(&self) -> ProductivityLevel {
        ProductivityLevel::from_score(self.productivity_score)
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown::compute(self.completed_tasks, self.total_focus_hours, self.current_streak)
    }
}

/// Apply `event` to `stats` and rebuild the score.
///
/// Pure: the result depends only on the arguments.
pub fn recompute(stats: &UserStats, event: &StatsEvent, now: DateTime<Utc>) -> UserStats {
    let mut next = stats.clone();
    match *event {
        StatsEvent::FocusSessionFinished {
            total_focus_hours,
            current_streak,
            active_days,
        } => {
            next.total_focus_hours = non_negative(total_focus_hours);
            next.current_streak = current_streak;
            next.daily_average = if active_days > 0 {
                next.total_focus_hours / f64::from(active_days)
            } else {
                0.0
            };
        }
        StatsEvent::TaskCompleted { completed_tasks } => {
            next.completed_tasks = completed_tasks;
        }
        StatsEvent::GoalsUpdated {
            weekly_goal,
            monthly_goal,
        } => {
            if let Some(w) = weekly_goal.filter(|w| *w > 0.0) {
                next.weekly_goal = w;
            }
            if let Some(m) = monthly_goal.filter(|m| *m > 0.0) {
                next.monthly_goal = m;
            }
        }
    }
    next.productivity_score = next.breakdown().productivity_score;
    next.last_active = now;
    next
}

/// Reject non-positive goals before they reach [`recompute`].
///
/// # Errors
/// Names the first offending goal.
pub fn validate_goals(weekly: Option<f64>, monthly: Option<f64>) -> Result<(), ValidationError> {
    for (field, value) in [("weekly_goal", weekly), ("monthly_goal", monthly)] {
        if let Some(v) = value {
            if !(v > 0.0) {
                return Err(ValidationError::NotPositive { field, value: v });
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub completed_score: f64,
    pub focus_score: f64,
    pub streak_score: f64,
    pub productivity_score: u32,
}

impl ScoreBreakdown {
    pub fn compute(completed_tasks: u32, total_focus_hours: f64, current_streak: u32) -> Self {
        let completed_score = clamp_pct(f64::from(completed_tasks) / TASKS_FOR_FULL_SCORE * 100.0);
        let focus_score = clamp_pct(non_negative(total_focus_hours) / HOURS_FOR_FULL_SCORE * 100.0);
        let streak_score = clamp_pct(f64::from(current_streak) * POINTS_PER_STREAK_DAY);
        let weighted = completed_score * COMPLETED_WEIGHT
            + focus_score * FOCUS_WEIGHT
            + streak_score * STREAK_WEIGHT;
        Self {
            completed_score,
            focus_score,
            streak_score,
            productivity_score: clamp_pct(weighted).round() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductivityLevel {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl ProductivityLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            ProductivityLevel::Excellent
        } else if score >= 60 {
            ProductivityLevel::Good
        } else if score >= 40 {
            ProductivityLevel::Average
        } else {
            ProductivityLevel::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductivityLevel::Excellent => "Excellent",
            ProductivityLevel::Good => "Good",
            ProductivityLevel::Average => "Average",
            ProductivityLevel::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Hours against goals over trailing windows ending at `now`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub weekly_hours: f64,
    pub weekly_goal: f64,
    pub weekly_pct: f64,
    pub monthly_hours: f64,
    pub monthly_goal: f64,
    pub monthly_pct: f64,
}

impl GoalProgress {
    pub fn compute(stats: &UserStats, sessions: &SessionStore, now: DateTime<Utc>) -> Self {
        let weekly_hours = sessions.hours_since(now - Duration::days(7));
        let monthly_hours = sessions.hours_since(now - Duration::days(30));
        Self {
            weekly_hours,
            weekly_goal: stats.weekly_goal,
            weekly_pct: pct_of(weekly_hours, stats.weekly_goal),
            monthly_hours,
            monthly_goal: stats.monthly_goal,
            monthly_pct: pct_of(monthly_hours, stats.monthly_goal),
        }
    }
}

fn pct_of(value: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    clamp_pct(value / goal * 100.0)
}

fn clamp_pct(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 100.0)
}

fn non_negative(v: f64) -> f64 {
    if v.is_nan() || v < 0.0 {
        0.0
    } else {
        v
    }
}
