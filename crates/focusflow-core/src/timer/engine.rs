//! Pomodoro timer engine.
//!
//! A tick-driven state machine with no internal thread. The caller invokes
//! `tick()` once per second while the timer runs, or `catch_up()` with a
//! wall-clock reading when ticks were not delivered live (the CLI persists
//! the engine between invocations and catches up on each one).
//!
//! ## Mode cycle
//!
//! ```text
//! Focus -> ShortBreak -> Focus -> ... -> Focus -> LongBreak -> Focus
//! ```
//!
//! Running/paused is orthogonal to the mode.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerConfig::default());
//! engine.start();
//! // Once per second:
//! if let Some(event) = engine.tick() { /* FocusCompleted, ModeChanged */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::TimerConfig;
use super::mode::{transition, TimerMode};
use crate::error::ValidationError;
use crate::events::Event;

/// What the current focus interval is being spent on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTask {
    /// Stored task id, or `None` for an ad-hoc quick session.
    pub task_id: Option<String>,
    pub label: String,
}

impl ActiveTask {
    pub fn quick(label: impl Into<String>) -> Self {
        Self {
            task_id: None,
            label: label.into(),
        }
    }
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    config: TimerConfig,
    mode: TimerMode,
    remaining_secs: u64,
    running: bool,
    /// Focus intervals finished (completed or skipped) since creation.
    focus_intervals: u32,
    #[serde(default)]
    task: Option<ActiveTask>,
    /// Wall-clock time (ms since epoch) up to which ticks have been applied.
    /// Only set while running.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

impl TimerEngine {
    /// Create a paused engine at the start of a focus interval.
    ///
    /// The config is trusted here; use [`TimerEngine::set_config`] for user
    /// input.
    pub fn new(config: TimerConfig) -> Self {
        let remaining_secs = config.duration_secs(TimerMode::Focus);
        Self {
            config,
            mode: TimerMode::Focus,
            remaining_secs,
            running: false,
            focus_intervals: 0,
            task: None,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn focus_intervals(&self) -> u32 {
        self.focus_intervals
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn task(&self) -> Option<&ActiveTask> {
        self.task.as_ref()
    }

    pub fn last_tick_epoch_ms(&self) -> Option<u64> {
        self.last_tick_epoch_ms
    }

    pub fn total_secs(&self) -> u64 {
        self.config.duration_secs(self.mode)
    }

    /// 0.0 .. 100.0 progress within the current mode.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_secs as f64 / total as f64) * 100.0
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn remaining_display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            mode_label: self.mode.label().to_string(),
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            focus_intervals: self.focus_intervals,
            task_label: self.task.as_ref().map(|t| t.label.clone()),
            progress_pct: self.progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.last_tick_epoch_ms = Some(now_ms());
        let fresh = self.remaining_secs == self.total_secs();
        debug!(mode = ?self.mode, remaining = self.remaining_secs, fresh, "timer running");
        Some(if fresh {
            Event::TimerStarted {
                mode: self.mode,
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            }
        } else {
            Event::TimerResumed {
                mode: self.mode,
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            }
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        self.last_tick_epoch_ms = None;
        debug!(mode = ?self.mode, remaining = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Start when paused, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Reload the countdown for the current mode and stop. Mode is unchanged.
    pub fn reset(&mut self) -> Option<Event> {
        self.running = false;
        self.last_tick_epoch_ms = None;
        self.remaining_secs = self.total_secs();
        Some(Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Move to the next mode now, as if the countdown had reached zero,
    /// without reporting a focus completion.
    pub fn skip(&mut self) -> Option<Event> {
        let from = self.mode;
        self.advance_mode(now_ms());
        info!(from = ?from, to = ?self.mode, "timer skipped");
        Some(Event::TimerSkipped {
            from,
            to: self.mode,
            auto_started: self.running,
            at: Utc::now(),
        })
    }

    /// Set or clear what the focus interval is for.
    pub fn set_task(&mut self, task: Option<ActiveTask>) {
        self.task = task;
    }

    /// Replace the configuration.
    ///
    /// The countdown is reloaded for the current mode when it has not been
    /// started yet or when it no longer fits in the new duration.
    ///
    /// # Errors
    /// Returns a validation error and leaves the engine untouched when a
    /// duration or the long-break cadence is zero.
    pub fn set_config(&mut self, config: TimerConfig) -> Result<(), ValidationError> {
        config.validate()?;
        let untouched = self.remaining_secs == self.total_secs();
        self.config = config;
        let total = self.total_secs();
        if untouched || self.remaining_secs > total {
            self.remaining_secs = total;
        }
        Ok(())
    }

    /// Apply one second. Returns the transition event when the countdown
    /// reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    /// Apply up to `secs` ticks, stopping early if the engine pauses itself.
    pub fn advance(&mut self, secs: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..secs {
            if !self.running {
                break;
            }
            if let Some(event) = self.tick() {
                events.push(event);
            }
        }
        events
    }

    /// Apply the whole seconds elapsed between the last applied tick and
    /// `now_epoch_ms`. Sub-second remainders carry over to the next call.
    ///
    /// Each event is stamped with the second its tick stands for, so an
    /// interval that ended hours ago is reported at that time.
    pub fn catch_up(&mut self, now_epoch_ms: u64) -> Vec<Event> {
        let Some(last) = self.last_tick_epoch_ms else {
            return Vec::new();
        };
        let elapsed_secs = now_epoch_ms.saturating_sub(last) / 1000;
        if elapsed_secs == 0 {
            return Vec::new();
        }
        let mut events = Vec::new();
        for n in 1..=elapsed_secs {
            if !self.running {
                break;
            }
            if let Some(event) = self.tick_at(last + n * 1000) {
                events.push(event);
            }
        }
        if self.running {
            self.last_tick_epoch_ms = Some(last + elapsed_secs * 1000);
        }
        events
    }

    /// `catch_up` against the system clock.
    pub fn catch_up_now(&mut self) -> Vec<Event> {
        self.catch_up(now_ms())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick_at(&mut self, at_ms: u64) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        Some(self.complete(at_ms))
    }

    fn complete(&mut self, at_ms: u64) -> Event {
        let from = self.mode;
        let duration_min = self.config.duration_min(from);
        let at = datetime_from_ms(at_ms);
        self.advance_mode(at_ms);
        match from {
            TimerMode::Focus => {
                let task = self.task.clone();
                info!(
                    duration_min,
                    intervals = self.focus_intervals,
                    next = ?self.mode,
                    "focus interval completed"
                );
                Event::FocusCompleted {
                    duration_min,
                    task_id: task.as_ref().and_then(|t| t.task_id.clone()),
                    task_label: task.map(|t| t.label),
                    focus_intervals: self.focus_intervals,
                    next_mode: self.mode,
                    auto_started: self.running,
                    at,
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => {
                debug!(from = ?from, "break finished");
                Event::ModeChanged {
                    from,
                    to: self.mode,
                    auto_started: self.running,
                    at,
                }
            }
        }
    }

    fn advance_mode(&mut self, at_ms: u64) {
        let t = transition(
            self.mode,
            self.focus_intervals,
            self.config.intervals_before_long_break,
        );
        self.mode = t.next;
        self.focus_intervals = t.focus_intervals;
        self.remaining_secs = self.total_secs();
        self.running = self.config.auto_start_next;
        if !self.running {
            self.last_tick_epoch_ms = None;
        } else if self.last_tick_epoch_ms.is_none() {
            self.last_tick_epoch_ms = Some(at_ms);
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn datetime_from_ms(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config(auto_start_next: bool) -> TimerConfig {
        TimerConfig {
            focus_min: 1,
            short_break_min: 1,
            long_break_min: 2,
            intervals_before_long_break: 2,
            auto_start_next,
        }
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::default();
        assert!(!engine.is_running());

        assert!(matches!(engine.start(), Some(Event::TimerStarted { .. })));
        assert!(engine.is_running());
        assert!(engine.start().is_none());

        engine.tick();
        assert!(matches!(engine.pause(), Some(Event::TimerPaused { .. })));
        assert!(!engine.is_running());
        assert!(engine.pause().is_none());

        assert!(matches!(engine.start(), Some(Event::TimerResumed { .. })));
    }

    #[test]
    fn tick_does_nothing_while_paused() {
        let mut engine = TimerEngine::default();
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 25 * 60);
    }

    #[test]
    fn focus_completion_emits_event_with_task() {
        let mut engine = TimerEngine::new(short_config(false));
        engine.set_task(Some(ActiveTask {
            task_id: Some("t1".into()),
            label: "Write report".into(),
        }));
        engine.start();
        let events = engine.advance(60);
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::FocusCompleted {
                duration_min,
                task_id,
                task_label,
                focus_intervals,
                next_mode,
                auto_started,
                ..
            } => {
                assert_eq!(*duration_min, 1);
                assert_eq!(task_id.as_deref(), Some("t1"));
                assert_eq!(task_label.as_deref(), Some("Write report"));
                assert_eq!(*focus_intervals, 1);
                assert_eq!(*next_mode, TimerMode::ShortBreak);
                assert!(!auto_started);
            }
            other => panic!("expected FocusCompleted, got {other:?}"),
        }
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn break_completion_returns_to_focus_without_completion_event() {
        let mut engine = TimerEngine::new(short_config(true));
        engine.start();
        let events = engine.advance(120);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_focus_completed());
        assert!(matches!(
            events[1],
            Event::ModeChanged {
                from: TimerMode::ShortBreak,
                to: TimerMode::Focus,
                ..
            }
        ));
        assert!(engine.is_running());
        assert_eq!(engine.focus_intervals(), 1);
    }

    #[test]
    fn auto_start_runs_through_long_break() {
        let mut engine = TimerEngine::new(short_config(true));
        engine.start();
        // focus 60 + short 60 + focus 60 lands on the long break
        engine.advance(180);
        assert_eq!(engine.mode(), TimerMode::LongBreak);
        assert_eq!(engine.remaining_secs(), 120);
        assert!(engine.is_running());
    }

    #[test]
    fn skip_advances_without_completion() {
        let mut engine = TimerEngine::new(short_config(false));
        match engine.skip() {
            Some(Event::TimerSkipped { from, to, .. }) => {
                assert_eq!(from, TimerMode::Focus);
                assert_eq!(to, TimerMode::ShortBreak);
            }
            other => panic!("expected TimerSkipped, got {other:?}"),
        }
        assert_eq!(engine.focus_intervals(), 1);
        engine.skip();
        assert_eq!(engine.mode(), TimerMode::Focus);
        engine.skip();
        assert_eq!(engine.mode(), TimerMode::LongBreak);
    }

    #[test]
    fn reset_keeps_mode_and_reloads_countdown() {
        let mut engine = TimerEngine::new(short_config(false));
        engine.skip();
        engine.start();
        engine.advance(10);
        assert_eq!(engine.remaining_secs(), 50);
        engine.reset();
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.remaining_secs(), 60);
        assert!(!engine.is_running());
    }

    #[test]
    fn set_config_rejects_zero_and_keeps_old() {
        let mut engine = TimerEngine::default();
        let bad = TimerConfig {
            focus_min: 0,
            ..TimerConfig::default()
        };
        assert!(engine.set_config(bad).is_err());
        assert_eq!(engine.config().focus_min, 25);
    }

    #[test]
    fn set_config_reloads_untouched_countdown() {
        let mut engine = TimerEngine::default();
        engine
            .set_config(TimerConfig {
                focus_min: 50,
                ..TimerConfig::default()
            })
            .unwrap();
        assert_eq!(engine.remaining_secs(), 50 * 60);
    }

    #[test]
    fn set_config_clamps_running_countdown() {
        let mut engine = TimerEngine::default();
        engine.start();
        engine.advance(5);
        engine
            .set_config(TimerConfig {
                focus_min: 1,
                ..TimerConfig::default()
            })
            .unwrap();
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn catch_up_applies_whole_seconds() {
        let mut engine = TimerEngine::new(short_config(false));
        engine.start();
        let t0 = engine.last_tick_epoch_ms().unwrap();
        assert!(engine.catch_up(t0 + 30_500).is_empty());
        assert_eq!(engine.remaining_secs(), 30);
        assert_eq!(engine.last_tick_epoch_ms(), Some(t0 + 30_000));

        let events = engine.catch_up(t0 + 90_000);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_focus_completed());
        assert!(!engine.is_running());
        assert!(engine.last_tick_epoch_ms().is_none());
    }

    #[test]
    fn catch_up_stamps_each_completion_when_it_ended() {
        let mut engine = TimerEngine::default();
        engine.start();
        let t0 = engine.last_tick_epoch_ms().unwrap();
        let three_days_ms = 3 * 24 * 60 * 60 * 1000;

        let stamps: Vec<DateTime<Utc>> = engine
            .catch_up(t0 + three_days_ms)
            .into_iter()
            .filter_map(|e| match e {
                Event::FocusCompleted { at, .. } => Some(at),
                _ => None,
            })
            .collect();

        assert!(!stamps.is_empty());
        assert_eq!(stamps[0], datetime_from_ms(t0 + 25 * 60 * 1000));
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        let dates: std::collections::BTreeSet<_> =
            stamps.iter().map(|at| at.date_naive()).collect();
        assert!(dates.len() >= 3, "dates: {dates:?}");
        assert!(*stamps.last().unwrap() <= datetime_from_ms(t0 + three_days_ms));
    }

    #[test]
    fn skip_while_paused_with_auto_start_keeps_clock() {
        let mut engine = TimerEngine::new(short_config(true));
        engine.skip();
        assert!(engine.is_running());
        assert!(engine.last_tick_epoch_ms().is_some());
    }

    #[test]
    fn snapshot_reports_state() {
        let engine = TimerEngine::default();
        match engine.snapshot() {
            Event::StateSnapshot {
                mode,
                running,
                remaining_secs,
                total_secs,
                ..
            } => {
                assert_eq!(mode, TimerMode::Focus);
                assert!(!running);
                assert_eq!(remaining_secs, 1500);
                assert_eq!(total_secs, 1500);
            }
            other => panic!("expected StateSnapshot, got {other:?}"),
        }
        assert_eq!(engine.remaining_display(), "25:00");
    }

    #[test]
    fn engine_roundtrips_through_json() {
        let mut engine = TimerEngine::new(short_config(true));
        engine.set_task(Some(ActiveTask::quick("Planning")));
        engine.skip();
        let json = serde_json::to_string(&engine).unwrap();
        let back: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mode(), TimerMode::ShortBreak);
        assert_eq!(back.task().map(|t| t.label.as_str()), Some("Planning"));
    }
}
