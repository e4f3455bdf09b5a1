use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sessions::WorkSession;
use crate::timer::{DurationConfig, Mode};

/// Every state change in the timer produces an Event.
/// The CLI prints them; the runtime broadcasts them to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Manual or policy-driven mode change. `interrupted` is set when a
    /// running countdown was discarded by the switch.
    ModeSwitched {
        from: Mode,
        to: Mode,
        remaining_secs: u64,
        interrupted: bool,
        at: DateTime<Utc>,
    },
    /// A running countdown reached zero. Fired exactly once per countdown.
    SessionCompleted {
        mode: Mode,
        duration_secs: u64,
        next_mode: Mode,
        celebratory: bool,
        at: DateTime<Utc>,
    },
    /// The completed countdown was appended to the session history.
    SessionRecorded { session: WorkSession },
    /// The completed countdown could not be appended (e.g. nobody logged in).
    SessionNotRecorded {
        mode: Mode,
        reason: String,
        at: DateTime<Utc>,
    },
    DurationsUpdated {
        durations: DurationConfig,
        /// Whether the visible countdown was resynced to the new value.
        resynced: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        display: String,
        at: DateTime<Utc>,
    },
}
