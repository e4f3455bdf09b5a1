use serde::{Deserialize, Serialize};

use super::WorkSession;
use crate::timer::Mode;

/// How many sessions the recent-activity list keeps.
pub const RECENT_LIMIT: usize = 5;

/// Per-user dashboard numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Seconds spent in completed Focus sessions. Breaks never count.
    #[serde(rename = "totalFocusTime")]
    pub total_focus_seconds: u64,
    #[serde(rename = "focusSessionsCompleted")]
    pub focus_session_count: u64,
    /// Newest first, at most [`RECENT_LIMIT`].
    pub recent_sessions: Vec<WorkSession>,
}

impl UserStats {
    /// Aggregate `sessions` for one user.
    pub fn aggregate(sessions: &[WorkSession], user_id: &str) -> Self {
        let mut mine: Vec<WorkSession> = sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();

        let (count, total) = mine
            .iter()
            .filter(|s| s.mode == Mode::Focus)
            .fold((0u64, 0u64), |(n, secs), s| {
                (n + 1, secs.saturating_add(s.duration_secs))
            });

        mine.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        mine.truncate(RECENT_LIMIT);

        Self {
            total_focus_seconds: total,
            focus_session_count: count,
            recent_sessions: mine,
        }
    }

    pub fn focus_time_display(&self) -> String {
        format_focus_time(self.total_focus_seconds)
    }
}

/// `"{h}h {m}m"` from one hour up, `"{m}m"` below.
pub fn format_focus_time(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}
