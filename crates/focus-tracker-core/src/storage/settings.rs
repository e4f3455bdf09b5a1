//! Persisted timer durations.
//!
//! The only mutation path for configured durations.

use std::sync::Arc;

use super::{keys, read_json, write_json, KvStore};
use crate::error::Result;
use crate::timer::DurationConfig;

#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn KvStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Stored durations, or defaults when absent, unreadable or invalid.
    pub fn get_durations(&self) -> Result<DurationConfig> {
        let stored: Option<DurationConfig> = read_json(&*self.store, keys::DURATION_CONFIG)?;
        let Some(stored) = stored else {
            return Ok(DurationConfig::default());
        };
        if let Err(e) = stored.validate() {
            tracing::warn!(error = %e, "ignoring invalid stored durations");
            return Ok(DurationConfig::default());
        }
        Ok(stored)
    }

    /// # Errors
    /// Rejects any zero duration; nothing is written in that case.
    pub fn set_durations(&self, durations: DurationConfig) -> Result<()> {
        durations.validate()?;
        write_json(&*self.store, keys::DURATION_CONFIG, &durations)?;
        tracing::info!(
            focus = durations.focus,
            short_break = durations.short_break,
            long_break = durations.long_break,
            "durations updated"
        );
        Ok(())
    }
}
