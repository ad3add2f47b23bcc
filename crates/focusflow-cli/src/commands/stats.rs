use clap::Subcommand;
use focusflow_core::Database;
use serde_json::json;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Print stats, score breakdown and level
    Show,
    /// Set weekly and/or monthly focus goals (hours)
    Goals {
        #[arg(long)]
        weekly: Option<f64>,
        #[arg(long)]
        monthly: Option<f64>,
    },
    /// Hours against goals over the last 7 and 30 days
    Progress,
    /// Full analytics report
    Analytics,
}

pub fn run(action: StatsAction) -> CmdResult {
    let mut db = Database::open()?;
    let mut tracker = open_tracker(&mut db)?;

    match action {
        StatsAction::Show => {
            let stats = tracker.stats();
            print_json(&json!({
                "stats": stats,
                "breakdown": stats.breakdown(),
                "level": stats.level().label(),
            }))?;
        }
        StatsAction::Goals { weekly, monthly } => {
            if weekly.is_none() && monthly.is_none() {
                return Err("nothing to update: pass --weekly and/or --monthly".into());
            }
            let stats = tracker.update_goals(weekly, monthly)?;
            print_json(stats)?;
        }
        StatsAction::Progress => {
            print_json(&tracker.goal_progress())?;
        }
        StatsAction::Analytics => {
            print_json(&tracker.analytics())?;
        }
    }
    Ok(())
}
