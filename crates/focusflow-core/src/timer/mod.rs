mod config;
mod engine;
mod mode;

pub use config::TimerConfig;
pub use engine::{ActiveTask, TimerEngine};
pub use mode::{transition, TimerMode, Transition};
