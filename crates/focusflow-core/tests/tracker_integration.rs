//! Integration tests for the tracker over an on-disk database.
//!
//! Covers the path from timer ticks to session records, task completion and
//! stats, and that everything survives reopening the database file.

use chrono::{Duration, Utc};
use focusflow_core::{
    Accounts, Database, Event, GoalDefaults, NewTask, ProductivityLevel, TimerConfig, TimerEngine,
    TimerMode, Tracker,
};

fn one_minute_config() -> TimerConfig {
    TimerConfig {
        focus_min: 1,
        short_break_min: 1,
        long_break_min: 1,
        intervals_before_long_break: 4,
        auto_start_next: true,
    }
}

#[test]
fn test_timer_to_stats_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusflow.db");
    let goals = GoalDefaults::default();

    let task_id;
    {
        let mut db = Database::open_at(&path).unwrap();
        let user = Accounts::new(&mut db, goals).login("ada@example.com").unwrap();
        let mut tracker = Tracker::open(&mut db, user, goals, false).unwrap();
        let task = tracker.add_task(NewTask::new("Deep Work", 25)).unwrap();
        task_id = task.id.clone();

        let mut engine = TimerEngine::new(one_minute_config());
        engine.set_task(tracker.focus_on(&task_id));
        engine.start();

        // Four full cycles: the fourth focus interval leads into a long break.
        let events = engine.advance(60 * 8);
        let next_modes: Vec<TimerMode> = events
            .iter()
            .filter_map(|e| match e {
                Event::FocusCompleted { next_mode, .. } => Some(*next_mode),
                _ => None,
            })
            .collect();
        assert_eq!(
            next_modes,
            vec![
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::LongBreak,
            ]
        );

        tracker.handle_events(&events).unwrap();
        assert_eq!(tracker.sessions().len(), 4);
        assert!(tracker.task(&task_id).unwrap().completed);
        assert_eq!(tracker.stats().completed_tasks(), 1);
    }

    let mut db = Database::open_at(&path).unwrap();
    let user = Accounts::new(&mut db, goals).require_current().unwrap();
    let tracker = Tracker::open(&mut db, user, goals, false).unwrap();
    assert_eq!(tracker.sessions().len(), 4);
    assert!((tracker.sessions().total_hours() - 4.0 / 60.0).abs() < 1e-9);
    assert!(tracker.task(&task_id).unwrap().completed);
    assert_eq!(tracker.stats().current_streak(), 1);
}

#[test]
fn test_catch_up_spreads_sessions_over_days() {
    let mut db = Database::open_memory().unwrap();
    let goals = GoalDefaults::default();
    let user = Accounts::new(&mut db, goals).login("ada@example.com").unwrap();
    let mut tracker = Tracker::open(&mut db, user, goals, false).unwrap();

    let mut engine = TimerEngine::new(TimerConfig::default());
    engine.start();
    let t0 = engine.last_tick_epoch_ms().unwrap();
    let events = engine.catch_up(t0 + 3 * 24 * 60 * 60 * 1000);
    tracker.handle_events(&events).unwrap();

    let sessions = tracker.sessions();
    assert!(sessions.len() > 1);
    assert!(sessions.active_days() >= 3);
    let first = sessions.list()[0].timestamp.timestamp_millis();
    assert_eq!(first, i64::try_from(t0).unwrap() + 25 * 60 * 1000);
}

#[test]
fn test_skip_records_nothing() {
    let mut db = Database::open_memory().unwrap();
    let goals = GoalDefaults::default();
    let user = Accounts::new(&mut db, goals).login("ada@example.com").unwrap();
    let mut tracker = Tracker::open(&mut db, user, goals, false).unwrap();

    let mut engine = TimerEngine::new(one_minute_config());
    engine.start();
    let skipped = engine.skip().unwrap();
    tracker.handle_event(&skipped).unwrap();

    assert_eq!(engine.mode(), TimerMode::ShortBreak);
    assert_eq!(engine.focus_intervals(), 1);
    assert!(tracker.sessions().is_empty());
    assert_eq!(tracker.stats().total_focus_hours(), 0.0);
}

#[test]
fn test_score_scenario() {
    let mut db = Database::open_memory().unwrap();
    let goals = GoalDefaults::default();
    let user = Accounts::new(&mut db, goals).login("ada@example.com").unwrap();
    let mut tracker = Tracker::open(&mut db, user, goals, false).unwrap();

    for i in 0..5 {
        let task = tracker
            .add_task(NewTask::new(format!("Task {i}"), 30))
            .unwrap();
        tracker.complete_task(&task.id).unwrap();
    }
    // 25 hours spread over the last three days gives a 3-day streak.
    let now = Utc::now();
    for days_ago in 0..3 {
        tracker
            .log_session(500.0, None, now - Duration::days(days_ago))
            .unwrap();
    }

    let stats = tracker.stats();
    assert_eq!(stats.completed_tasks(), 5);
    assert!((stats.total_focus_hours() - 25.0).abs() < 1e-9);
    assert_eq!(stats.current_streak(), 3);
    assert_eq!(stats.productivity_score(), 46);
    assert_eq!(stats.level(), ProductivityLevel::Average);
}

#[test]
fn test_reset_clears_user_but_not_others() {
    let mut db = Database::open_memory().unwrap();
    let goals = GoalDefaults::default();

    let grace = Accounts::new(&mut db, goals).login("grace@example.com").unwrap();
    {
        let mut tracker = Tracker::open(&mut db, grace.clone(), goals, false).unwrap();
        tracker.log_session(30.0, None, Utc::now()).unwrap();
    }

    let ada = Accounts::new(&mut db, goals).login("ada@example.com").unwrap();
    let mut tracker = Tracker::open(&mut db, ada, goals, false).unwrap();
    tracker.add_task(NewTask::new("Read", 20)).unwrap();
    tracker.log_session(60.0, None, Utc::now()).unwrap();
    tracker.reset().unwrap();
    assert!(tracker.tasks().is_empty());
    assert!(tracker.sessions().is_empty());
    assert_eq!(tracker.stats().productivity_score(), 0);
    drop(tracker);

    let tracker = Tracker::open(&mut db, grace, goals, false).unwrap();
    assert_eq!(tracker.sessions().total_hours(), 0.5);
}
