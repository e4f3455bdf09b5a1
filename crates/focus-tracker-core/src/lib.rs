//! # Focus Tracker Core Library
//!
//! Business logic for the Focus Tracker Pomodoro timer: a countdown state
//! machine, a mocked account backend, and a per-user session history with
//! dashboard statistics. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a pure state machine advanced one second per `tick()`
//! - **Mode Policy**: what follows a completed countdown
//! - **Timer Runtime**: drives the engine in real time with a cancellable
//!   ticker and wires completions to the session history
//! - **Storage**: an injected key-value store (SQLite or in-memory) holding
//!   accounts, the current-session pointer, sessions and durations, plus a
//!   TOML config file
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerRuntime`]: Real-time driver with completion handling
//! - [`SessionRepository`]: Session history and statistics
//! - [`Accounts`]: Signup, login and the current user
//! - [`KvStore`]: Storage abstraction every component is built on

pub mod auth;
pub mod error;
pub mod events;
pub mod notify;
pub mod runtime;
pub mod sessions;
pub mod storage;
pub mod timer;

pub use auth::{Account, Accounts, CurrentUser};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use notify::{CompletionSignal, LogNotifier, NoopNotifier, Notifier};
pub use runtime::TimerRuntime;
pub use sessions::{SessionRepository, UserStats, WorkSession};
pub use storage::{Config, KvStore, MemoryStore, Settings, SqliteStore};
pub use timer::{DurationConfig, Mode, TimerEngine, TimerState};
