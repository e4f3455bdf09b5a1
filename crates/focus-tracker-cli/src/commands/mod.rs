pub mod auth;
pub mod config;
pub mod durations;
pub mod stats;
pub mod timer;

use std::sync::Arc;

use focus_tracker_core::{
    Accounts, Config, KvStore, SessionRepository, Settings, SqliteStore,
};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// The process-wide store and config, opened once per command.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn KvStore>,
}

impl AppContext {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let store: Arc<dyn KvStore> = Arc::new(SqliteStore::open()?);
        Ok(Self { config, store })
    }

    pub fn accounts(&self) -> Accounts {
        Accounts::new(self.store.clone(), self.config.latency.auth())
    }

    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.store.clone(), self.config.latency.clone())
    }

    pub fn settings(&self) -> Settings {
        Settings::new(self.store.clone())
    }
}
