use clap::Subcommand;

use super::{AppContext, CmdResult};

#[derive(Subcommand)]
pub enum DurationsAction {
    /// Print the configured durations as JSON (seconds)
    Get,
    /// Change one or more durations; omitted modes keep their value
    Set {
        #[arg(long)]
        focus: Option<u64>,
        #[arg(long)]
        short_break: Option<u64>,
        #[arg(long)]
        long_break: Option<u64>,
        /// Interpret the values as seconds instead of minutes
        #[arg(long)]
        seconds: bool,
    },
}

pub async fn run(action: DurationsAction) -> CmdResult {
    let ctx = AppContext::open()?;
    let settings = ctx.settings();

    match action {
        DurationsAction::Get => {
            let durations = settings.get_durations()?;
            println!("{}", serde_json::to_string_pretty(&durations)?);
        }
        DurationsAction::Set {
            focus,
            short_break,
            long_break,
            seconds,
        } => {
            let unit = if seconds { 1 } else { 60 };
            let mut durations = settings.get_durations()?;
            if let Some(v) = focus {
                durations.focus = v.saturating_mul(unit);
            }
            if let Some(v) = short_break {
                durations.short_break = v.saturating_mul(unit);
            }
            if let Some(v) = long_break {
                durations.long_break = v.saturating_mul(unit);
            }
            settings.set_durations(durations)?;
            println!("{}", serde_json::to_string_pretty(&durations)?);
        }
    }
    Ok(())
}
