use clap::Subcommand;
use focus_tracker_core::UserStats;

use super::{AppContext, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Dashboard summary for a user (defaults to the logged-in user)
    Show {
        /// User id to report on
        #[arg(long)]
        user: Option<String>,
        /// Print the raw statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every recorded session for every user
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: StatsAction) -> CmdResult {
    let ctx = AppContext::open()?;
    let sessions = ctx.sessions();

    match action {
        StatsAction::Show { user, json } => {
            let stats = sessions.compute_stats(user.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", render(&stats));
            }
        }
        StatsAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear all sessions without --yes".into());
            }
            sessions.clear_all().await?;
            println!("all sessions cleared");
        }
    }
    Ok(())
}

fn render(stats: &UserStats) -> String {
    let mut out = format!(
        "Total focus time:  {}\nFocus sessions:    {}\n",
        stats.focus_time_display(),
        stats.focus_session_count
    );
    if stats.recent_sessions.is_empty() {
        out.push_str("No sessions yet.\n");
        return out;
    }
    out.push_str("Recent sessions:\n");
    for s in &stats.recent_sessions {
        out.push_str(&format!(
            "  {}  {:<11}  {} min\n",
            s.timestamp.format("%Y-%m-%d %H:%M"),
            s.mode.label(),
            s.duration_secs / 60
        ));
    }
    out
}
