//! # FocusFlow Core Library
//!
//! This library provides the core logic for FocusFlow, a focus-session
//! tracker: tasks, a Pomodoro-style timer, a log of focus sessions and the
//! productivity stats derived from them. The `focusflow` CLI is a thin layer
//! over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine over Focus / Short Break /
//!   Long Break; the caller delivers ticks or wall-clock catch-ups
//! - **Tracker**: per-user orchestrator that turns `FocusCompleted` events
//!   into session records, task completions and stats updates
//! - **Stats**: pure recomputation of the productivity score, goal progress
//!   and the analytics report
//! - **Storage**: JSON documents in a key-value store (SQLite or in-memory)
//!   plus TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Pomodoro state machine
//! - [`Tracker`]: task list, session log and stats for one user
//! - [`Accounts`]: local user directory
//! - [`Database`]: SQLite key-value persistence
//! - [`Config`]: application configuration

pub mod accounts;
pub mod error;
pub mod events;
pub mod onboarding;
pub mod session;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;
pub mod tracker;

pub use accounts::{Accounts, User};
pub use error::{AccountError, ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use session::{FocusSession, SessionStore};
pub use stats::{recompute, AnalyticsReport, GoalDefaults, GoalProgress, ProductivityLevel, StatsEvent, UserStats};
pub use storage::{data_dir, Config, Database, KvStore, MemoryStore};
pub use task::{NewTask, Priority, Task, TaskList, TaskUpdate};
pub use timer::{ActiveTask, TimerConfig, TimerEngine, TimerMode};
pub use tracker::Tracker;
