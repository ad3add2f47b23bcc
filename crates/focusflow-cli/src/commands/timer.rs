//! Timer commands.
//!
//! Each user's engine is persisted in the kv store between invocations. Every
//! command first catches the engine up with the wall clock and feeds the
//! resulting events to that user's tracker, so a focus interval that ran out
//! while no command was running is still logged, and logged for its owner.

use clap::Subcommand;
use focusflow_core::storage::{keys, load_json, load_json_or_default, save_json, KvStore};
use focusflow_core::{ActiveTask, Database, Event, TimerConfig, TimerEngine};
use serde_json::json;
use tracing::warn;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start {
        /// Focus on a stored task
        #[arg(long, conflicts_with = "label")]
        task: Option<String>,
        /// Focus on an ad-hoc label not backed by a task
        #[arg(long)]
        label: Option<String>,
    },
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Jump to the next mode without logging a session
    Skip,
    /// Reload the current mode's countdown and stop
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Timer durations and cadence
    Config {
        #[command(subcommand)]
        action: TimerConfigAction,
    },
}

#[derive(Subcommand)]
pub enum TimerConfigAction {
    /// Print the timer configuration
    Show,
    /// Change one or more settings
    Set {
        /// Focus length in minutes
        #[arg(long)]
        focus: Option<u32>,
        /// Short break length in minutes
        #[arg(long)]
        short_break: Option<u32>,
        /// Long break length in minutes
        #[arg(long)]
        long_break: Option<u32>,
        /// Focus intervals before a long break
        #[arg(long)]
        intervals: Option<u32>,
        /// Start the next mode automatically
        #[arg(long)]
        auto_start: Option<bool>,
    },
}

fn load_timer_config(store: &impl KvStore) -> CmdResult<TimerConfig> {
    Ok(load_json_or_default(store, keys::TIMER_CONFIG)?)
}

/// Load the engine stored under `key`, brought in line with the current
/// timer config.
fn load_engine(store: &impl KvStore, key: &str) -> CmdResult<TimerEngine> {
    let config = load_timer_config(store)?;
    let mut engine = match load_json::<TimerEngine>(store, key) {
        Ok(Some(engine)) => engine,
        Ok(None) => return Ok(TimerEngine::new(config)),
        Err(e) => {
            warn!(error = %e, "discarding unreadable timer state");
            return Ok(TimerEngine::new(config));
        }
    };
    if engine.config() != &config {
        engine.set_config(config)?;
    }
    Ok(engine)
}

fn save_engine(store: &mut impl KvStore, key: &str, engine: &TimerEngine) -> CmdResult {
    save_json(store, key, engine)?;
    Ok(())
}

fn run_config(db: &mut Database, action: TimerConfigAction) -> CmdResult {
    let mut config = load_timer_config(db)?;
    match action {
        TimerConfigAction::Show => {}
        TimerConfigAction::Set {
            focus,
            short_break,
            long_break,
            intervals,
            auto_start,
        } => {
            if let Some(v) = focus {
                config.focus_min = v;
            }
            if let Some(v) = short_break {
                config.short_break_min = v;
            }
            if let Some(v) = long_break {
                config.long_break_min = v;
            }
            if let Some(v) = intervals {
                config.intervals_before_long_break = v;
            }
            if let Some(v) = auto_start {
                config.auto_start_next = v;
            }

            config.validate()?;
            save_json(db, keys::TIMER_CONFIG, &config)?;
        }
    }
    print_json(&config)
}

pub fn run(action: TimerAction) -> CmdResult {
    let mut db = Database::open()?;
    let action = match action {
        TimerAction::Config { action } => return run_config(&mut db, action),
        other => other,
    };

    let mut tracker = open_tracker(&mut db)?;
    let engine_key = keys::timer_engine(&tracker.user().id);
    let mut engine = load_engine(tracker.store(), &engine_key)?;

    let mut events: Vec<Event> = engine.catch_up_now();
    tracker.handle_events(&events)?;

    let event = match action {
        TimerAction::Start { task, label } => {
            if let Some(id) = task {
                let target = tracker
                    .focus_on(&id)
                    .ok_or_else(|| format!("task not found: {id}"))?;
                engine.set_task(Some(target));
            } else if let Some(label) = label {
                engine.set_task(Some(ActiveTask::quick(label)));
            }
            engine.start()
        }
        TimerAction::Pause => engine.pause(),
        TimerAction::Resume => engine.start(),
        TimerAction::Skip => engine.skip(),
        TimerAction::Reset => engine.reset(),
        TimerAction::Status | TimerAction::Config { .. } => None,
    };
    events.extend(event);

    let db = tracker.into_store();
    save_engine(db, &engine_key, &engine)?;

    print_json(&json!({
        "events": events,
        "state": engine.snapshot(),
    }))
}
