use clap::Subcommand;
use focusflow_core::{Accounts, Config, Database};

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Log in, creating the user on first use
    Login {
        email: String,
    },
    /// Register a new user and log in
    Signup {
        email: String,
        /// Display name (defaults to the part of the email before '@')
        #[arg(long)]
        name: Option<String>,
    },
    /// Forget the current user
    Logout,
    /// Print the current user as JSON
    Whoami,
    /// List registered users
    List,
}

pub fn run(action: AccountAction) -> CmdResult {
    let mut db = Database::open()?;
    let config = Config::load()?;
    let mut accounts = Accounts::new(&mut db, config.goals);

    match action {
        AccountAction::Login { email } => {
            let user = accounts.login(&email)?;
            print_json(&user)?;
        }
        AccountAction::Signup { email, name } => {
            let user = accounts.signup(&email, name.as_deref())?;
            print_json(&user)?;
        }
        AccountAction::Logout => {
            accounts.logout()?;
            println!("logged out");
        }
        AccountAction::Whoami => {
            let user = accounts.require_current()?;
            print_json(&user)?;
        }
        AccountAction::List => {
            print_json(&accounts.users()?)?;
        }
    }
    Ok(())
}

pub fn reset(yes: bool) -> CmdResult {
    if !yes {
        return Err("refusing to reset without --yes".into());
    }
    let mut db = Database::open()?;
    let mut tracker = open_tracker(&mut db)?;
    tracker.reset()?;
    print_json(tracker.stats())
}
