//! Key-value persistence.
//!
//! Everything the app keeps lives as JSON under a handful of keys in a
//! [`KvStore`]. Components receive the store as `Arc<dyn KvStore>`; only the
//! outermost composition (the CLI) decides which implementation backs it.
//!
//! Writes are full-collection read-modify-write round trips with no
//! compare-and-swap. That is safe for one process; a second writer on the
//! same store can lose updates.

mod config;
pub mod database;
mod memory;
pub mod settings;

pub use config::{Config, LatencyConfig, LoggingConfig, TimerConfig};
pub(crate) use config::simulate;
pub use database::SqliteStore;
pub use memory::MemoryStore;
pub use settings::Settings;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StorageError};

/// Physical key names of the logical collections.
pub mod keys {
    /// Sequence of accounts.
    pub const ACCOUNTS: &str = "pomodoro_users";
    /// Pointer to the logged-in account.
    pub const CURRENT_SESSION: &str = "pomodoro_current_user";
    /// Sequence of recorded work sessions.
    pub const WORK_SESSIONS: &str = "pomodoro_sessions";
    /// Configured durations.
    pub const DURATION_CONFIG: &str = "pomodoro_durations";
}

/// Minimal string key-value store.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and parse a JSON value.
///
/// A value that fails to parse is treated as absent and logged, so one
/// corrupted key degrades to its default instead of failing the caller.
pub fn read_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "malformed persisted data, treating as absent");
            Ok(None)
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    Ok(())
}

/// Returns the data directory.
///
/// `FOCUS_TRACKER_HOME` wins when set. Otherwise `~/.config/focus-tracker`,
/// or `~/.config/focus-tracker-dev` when `FOCUS_TRACKER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FOCUS_TRACKER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("FOCUS_TRACKER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focus-tracker-dev")
            } else {
                base_dir.join("focus-tracker")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Probe {
        n: u32,
    }

    #[test]
    fn json_helpers_roundtrip() {
        let store = MemoryStore::new();
        write_json(&store, "probe", &Probe { n: 7 }).unwrap();
        let back: Option<Probe> = read_json(&store, "probe").unwrap();
        assert_eq!(back, Some(Probe { n: 7 }));
    }

    #[test]
    fn malformed_json_reads_as_absent() {
        let store = MemoryStore::new();
        store.set("probe", "{not json").unwrap();
        let back: Option<Probe> = read_json(&store, "probe").unwrap();
        assert!(back.is_none());
    }

    #[test]
    fn missing_key_reads_as_absent() {
        let store = MemoryStore::new();
        let back: Option<Probe> = read_json(&store, "probe").unwrap();
        assert!(back.is_none());
    }
}
