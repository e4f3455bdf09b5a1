use std::sync::Arc;

use clap::Subcommand;
use focus_tracker_core::{
    CompletionSignal, DurationConfig, Event, Mode, Notifier, TimerRuntime,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::{AppContext, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run an interactive timer, reading commands from stdin and printing
    /// events as JSON lines
    Run {
        /// Initial mode (focus, short-break, long-break)
        #[arg(long, default_value = "focus")]
        mode: Mode,
        /// Start immediately and again after every completed countdown
        #[arg(long)]
        autostart: bool,
        /// Exit after this many completed countdowns
        #[arg(long)]
        cycles: Option<u32>,
    },
}

/// Prints completion messages to stderr, ringing the bell for focus blocks.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, signal: CompletionSignal) {
        let bell = if signal.is_celebratory() { "\x07" } else { "" };
        eprintln!("{bell}{}", signal.message());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    Mode(Mode),
    Durations(DurationConfig),
    Status,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let cmd = match head.to_ascii_lowercase().as_str() {
        "start" | "s" => Command::Start,
        "pause" | "p" => Command::Pause,
        "toggle" | "t" => Command::Toggle,
        "reset" | "r" => Command::Reset,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "mode" | "m" => {
            let rest: Vec<&str> = words.collect();
            if rest.is_empty() {
                return Err("usage: mode <focus|short-break|long-break>".into());
            }
            let mode = rest.join(" ").parse::<Mode>().map_err(|e| e.to_string())?;
            Command::Mode(mode)
        }
        "durations" | "d" => {
            const USAGE: &str = "usage: durations <focus> <short-break> <long-break> (minutes)";
            let minutes = words
                .map(|w| w.parse::<u64>().map_err(|_| format!("not a number: {w}")))
                .collect::<Result<Vec<_>, _>>()?;
            let [focus, short, long] = minutes[..] else {
                return Err(USAGE.into());
            };
            Command::Durations(DurationConfig::from_minutes(focus, short, long))
        }
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Some(cmd))
}

const HELP: &str = "commands: start | pause | toggle | reset | mode <focus|short-break|long-break> \
                    | durations <focus> <short> <long> (minutes) | status | quit";

fn print_event(event: &Event) -> CmdResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub async fn run(action: TimerAction) -> CmdResult {
    match action {
        TimerAction::Run {
            mode,
            autostart,
            cycles,
        } => run_interactive(mode, autostart, cycles).await,
    }
}

async fn run_interactive(mode: Mode, autostart: bool, cycles: Option<u32>) -> CmdResult {
    let ctx = AppContext::open()?;
    if ctx.accounts().current_user()?.is_none() {
        tracing::warn!("no user logged in; completed sessions will not be recorded");
    }

    let runtime = TimerRuntime::new(
        ctx.sessions(),
        ctx.settings(),
        Arc::new(TerminalNotifier),
        ctx.config.timer.tick_interval(),
    )?;
    let mut events = runtime.subscribe();

    if mode != Mode::Focus {
        runtime.switch_mode(mode).await;
    }
    if autostart {
        runtime.start().await;
    }
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut completed = 0u32;

    loop {
        tokio::select! {
            biased;

            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event printer lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                print_event(&event)?;
                if matches!(
                    event,
                    Event::SessionRecorded { .. } | Event::SessionNotRecorded { .. }
                ) {
                    completed += 1;
                    if cycles.is_some_and(|limit| completed >= limit) {
                        break;
                    }
                    if autostart {
                        runtime.start().await;
                    }
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    // Without a cycle limit there is nobody left to drive the timer.
                    if cycles.is_none() {
                        break;
                    }
                    stdin_open = false;
                    continue;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Help)) => eprintln!("{HELP}"),
                    Ok(Some(Command::Status)) => print_event(&runtime.snapshot().await)?,
                    Ok(Some(Command::Start)) => {
                        runtime.start().await;
                    }
                    Ok(Some(Command::Pause)) => {
                        runtime.pause().await;
                    }
                    Ok(Some(Command::Toggle)) => {
                        runtime.toggle().await;
                    }
                    Ok(Some(Command::Reset)) => {
                        runtime.reset().await;
                    }
                    Ok(Some(Command::Mode(m))) => {
                        runtime.switch_mode(m).await;
                    }
                    Ok(Some(Command::Durations(d))) => {
                        if let Err(e) = runtime.set_durations(d).await {
                            eprintln!("{e}");
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Some(event) = runtime.shutdown().await {
        print_event(&event)?;
    }
    while let Ok(event) = events.try_recv() {
        print_event(&event)?;
    }
    Ok(())
}
