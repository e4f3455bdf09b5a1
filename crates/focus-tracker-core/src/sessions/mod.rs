//! Recorded work sessions and the statistics derived from them.

mod repository;
mod stats;

pub use repository::SessionRepository;
pub use stats::{format_focus_time, UserStats, RECENT_LIMIT};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// One fully completed countdown. Immutable once written.
///
/// Persisted as `{id, userId, mode, duration, timestamp}` with the timestamp
/// in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: String,
    /// Loose reference to an account id; not checked against the accounts.
    pub user_id: String,
    pub mode: Mode,
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}
