pub mod account;
pub mod config;
pub mod session;
pub mod stats;
pub mod task;
pub mod timer;

use focusflow_core::{Accounts, Config, Database, Tracker};
use serde::Serialize;

pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Open the logged-in user's tracker over `db`.
pub fn open_tracker(db: &mut Database) -> CmdResult<Tracker<&mut Database>> {
    let config = Config::load()?;
    let user = Accounts::new(&mut *db, config.goals).require_current()?;
    Ok(Tracker::open(
        db,
        user,
        config.goals,
        config.onboarding.welcome_tasks,
    )?)
}
