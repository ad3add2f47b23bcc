//! Per-user orchestrator.
//!
//! A [`Tracker`] holds one user's task list, session log and stats in memory
//! and writes each of them through to the key-value store after every
//! mutation. Timer events enter through [`Tracker::handle_event`]: a
//! `FocusCompleted` logs a session, marks the focused task done and rebuilds
//! the stats.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::accounts::{Accounts, User};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::onboarding;
use crate::session::{FocusSession, SessionStore};
use crate::stats::{
    recompute, validate_goals, AnalyticsReport, GoalDefaults, GoalProgress, StatsEvent, UserStats,
};
use crate::storage::{keys, load_json_or_default, save_json, KvStore};
use crate::task::{NewTask, Task, TaskList, TaskUpdate};
use crate::timer::ActiveTask;

pub struct Tracker<S: KvStore> {
    store: S,
    user: User,
    goals: GoalDefaults,
    tasks: TaskList,
    sessions: SessionStore,
    stats: UserStats,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KvStore> Tracker<S> {
    /// Load `user`'s data from `store`.
    ///
    /// A first-run user is marked onboarded here; with `seed_welcome` set and
    /// an empty task list they also get the welcome tasks.
    ///
    /// # Errors
    /// Storage errors only. Unreadable stored JSON is replaced by defaults.
    pub fn open(store: S, user: User, goals: GoalDefaults, seed_welcome: bool) -> Result<Self> {
        Self::open_with_clock(store, user, goals, seed_welcome, Utc::now)
    }

    /// [`Tracker::open`] with `clock` in place of the wall clock for
    /// timestamps, streaks and goal windows.
    pub fn open_with_clock(
        store: S,
        user: User,
        goals: GoalDefaults,
        seed_welcome: bool,
        clock: fn() -> DateTime<Utc>,
    ) -> Result<Self> {
        let tasks: TaskList = load_json_or_default(&store, &keys::tasks(&user.id))?;
        let sessions: SessionStore = load_json_or_default(&store, &keys::sessions(&user.id))?;
        let stats = match load_json_or_default::<Option<UserStats>>(&store, &keys::stats(&user.id))? {
            Some(stats) => stats,
            None => UserStats::initial(goals, clock()),
        };

        let mut tracker = Self {
            store,
            user,
            goals,
            tasks,
            sessions,
            stats,
            clock,
        };

        if tracker.user.is_new_user {
            if seed_welcome && onboarding::should_seed(&tracker.user, &tracker.tasks) {
                tracker.tasks = TaskList::new(onboarding::welcome_tasks());
                tracker.save_tasks()?;
                info!(user_id = %tracker.user.id, "seeded welcome tasks");
            }
            Accounts::new(&mut tracker.store, goals).mark_onboarded(&tracker.user.id)?;
            tracker.user.is_new_user = false;
        }
        tracker.refresh_streak()?;

        debug!(
            user_id = %tracker.user.id,
            tasks = tracker.tasks.len(),
            sessions = tracker.sessions.len(),
            "tracker opened"
        );
        Ok(tracker)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn goal_progress(&self) -> GoalProgress {
        GoalProgress::compute(&self.stats, &self.sessions, (self.clock)())
    }

    pub fn analytics(&self) -> AnalyticsReport {
        AnalyticsReport::build(self.tasks.as_slice(), &self.sessions, &self.stats, (self.clock)())
    }

    /// The timer target for a stored task.
    pub fn focus_on(&self, task_id: &str) -> Option<ActiveTask> {
        self.tasks.get(task_id).map(|t| ActiveTask {
            task_id: Some(t.id.clone()),
            label: t.title.clone(),
        })
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// # Errors
    /// Validation errors for a blank title or zero duration.
    pub fn add_task(&mut self, new_task: NewTask) -> Result<Task> {
        let task = self
            .tasks
            .add(new_task, Uuid::new_v4().to_string())?
            .clone();
        self.save_tasks()?;
        info!(task_id = %task.id, "task added");
        Ok(task)
    }

    /// Apply a partial update. Changing the completed flag adjusts the
    /// completed-task count the same way [`Tracker::toggle_task`] does.
    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Option<Task>> {
        let was_completed = match self.tasks.get(id) {
            Some(t) => t.completed,
            None => return Ok(None),
        };
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "title".into(),
                    message: "must not be empty".into(),
                }
                .into());
            }
        }
        if update.duration == Some(0) {
            return Err(ValidationError::NotPositive {
                field: "duration",
                value: 0.0,
            }
            .into());
        }

        let task = self.tasks.update(id, update).cloned();
        self.save_tasks()?;
        if let Some(t) = &task {
            self.count_completion_change(was_completed, t.completed)?;
        }
        Ok(task)
    }

    /// Flip a task's completed flag. Returns the new flag.
    pub fn toggle_task(&mut self, id: &str) -> Result<Option<bool>> {
        let Some(completed) = self.tasks.toggle(id) else {
            return Ok(None);
        };
        self.save_tasks()?;
        self.count_completion_change(!completed, completed)?;
        Ok(Some(completed))
    }

    /// Mark a task done. Returns `Some(true)` if it was open before.
    pub fn complete_task(&mut self, id: &str) -> Result<Option<bool>> {
        let Some(changed) = self.tasks.complete(id) else {
            return Ok(None);
        };
        if changed {
            self.save_tasks()?;
            self.count_completion_change(false, true)?;
        }
        Ok(Some(changed))
    }

    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        let removed = self.tasks.remove(id);
        if removed {
            self.save_tasks()?;
            info!(task_id = id, "task deleted");
        }
        Ok(removed)
    }

    pub fn clear_tasks(&mut self) -> Result<()> {
        self.tasks.clear();
        self.save_tasks()?;
        info!(user_id = %self.user.id, "tasks cleared");
        Ok(())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Log `minutes` of focus. Negative or non-finite durations are dropped
    /// and return `None`.
    pub fn log_session(
        &mut self,
        minutes: f64,
        label: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Option<FocusSession>> {
        let Some(session) = self
            .sessions
            .append(FocusSession::from_minutes(minutes, label, at))
            .cloned()
        else {
            return Ok(None);
        };
        self.save_sessions()?;

        let now = (self.clock)();
        let event = self.session_totals(now);
        self.apply(&event, now)?;
        info!(
            hours = session.hours,
            task = %session.task,
            total_hours = self.stats.total_focus_hours(),
            "focus session logged"
        );
        Ok(Some(session))
    }

    /// Feed a timer event. Only `FocusCompleted` has an effect.
    pub fn handle_event(&mut self, event: &Event) -> Result<()> {
        let Event::FocusCompleted {
            duration_min,
            task_id,
            task_label,
            at,
            ..
        } = event
        else {
            debug!(?event, "ignoring timer event");
            return Ok(());
        };

        self.log_session(f64::from(*duration_min), task_label.as_deref(), *at)?;
        if let Some(id) = task_id {
            if self.complete_task(id)?.is_none() {
                warn!(task_id = %id, "focused task no longer exists");
            }
        }
        Ok(())
    }

    pub fn handle_events<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) -> Result<()> {
        for event in events {
            self.handle_event(event)?;
        }
        Ok(())
    }

    // ── Stats ────────────────────────────────────────────────────────

    /// Change goals. `None` keeps the current value.
    ///
    /// # Errors
    /// Rejects non-positive goals; nothing is changed then.
    pub fn update_goals(&mut self, weekly: Option<f64>, monthly: Option<f64>) -> Result<&UserStats> {
        validate_goals(weekly, monthly)?;
        let event = StatsEvent::GoalsUpdated {
            weekly_goal: weekly,
            monthly_goal: monthly,
        };
        self.apply(&event, (self.clock)())?;
        Ok(&self.stats)
    }

    /// Wipe tasks, sessions and the user's timer, and return stats to their
    /// initial state.
    pub fn reset(&mut self) -> Result<()> {
        self.tasks.clear();
        self.sessions.clear();
        self.stats = UserStats::initial(self.goals, (self.clock)());
        self.store.remove(&keys::tasks(&self.user.id))?;
        self.store.remove(&keys::sessions(&self.user.id))?;
        self.store.remove(&keys::timer_engine(&self.user.id))?;
        self.save_stats()?;
        info!(user_id = %self.user.id, "user data reset");
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn count_completion_change(&mut self, before: bool, after: bool) -> Result<()> {
        let completed = match (before, after) {
            (false, true) => self.stats.completed_tasks().saturating_add(1),
            (true, false) => self.stats.completed_tasks().saturating_sub(1),
            _ => return Ok(()),
        };
        self.apply(
            &StatsEvent::TaskCompleted {
                completed_tasks: completed,
            },
            (self.clock)(),
        )
    }

    /// Totals as the session log reports them on `now`'s date.
    fn session_totals(&self, now: DateTime<Utc>) -> StatsEvent {
        StatsEvent::FocusSessionFinished {
            total_focus_hours: self.sessions.total_hours(),
            current_streak: self.sessions.current_streak(now.date_naive()),
            active_days: self.sessions.active_days(),
        }
    }

    /// Recompute, then rebuild again if the stored streak has lapsed since
    /// the last session.
    fn apply(&mut self, event: &StatsEvent, now: DateTime<Utc>) -> Result<()> {
        let mut next = recompute(&self.stats, event, now);
        let streak = self.sessions.current_streak(now.date_naive());
        if next.current_streak() != streak {
            next = recompute(&next, &self.session_totals(now), now);
        }
        self.stats = next;
        debug!(score = self.stats.productivity_score(), "stats recomputed");
        self.save_stats()
    }

    /// Bring a lapsed streak up to date without counting as activity.
    fn refresh_streak(&mut self) -> Result<()> {
        let now = (self.clock)();
        let streak = self.sessions.current_streak(now.date_naive());
        if self.stats.current_streak() == streak {
            return Ok(());
        }
        debug!(
            stored = self.stats.current_streak(),
            streak, "refreshing lapsed streak"
        );
        let last_active = self.stats.last_active();
        self.stats = recompute(&self.stats, &self.session_totals(now), last_active);
        self.save_stats()
    }

    fn save_tasks(&mut self) -> Result<()> {
        save_json(&mut self.store, &keys::tasks(&self.user.id), &self.tasks)
    }

    fn save_sessions(&mut self) -> Result<()> {
        save_json(&mut self.store, &keys::sessions(&self.user.id), &self.sessions)
    }

    fn save_stats(&mut self) -> Result<()> {
        save_json(&mut self.store, &keys::stats(&self.user.id), &self.stats)
    }
}
