mod engine;
mod mode;
pub mod policy;
pub mod ticker;

pub use engine::{format_clock, TimerEngine, TimerState};
pub use mode::{DurationConfig, Mode};
pub use policy::Transition;
pub use ticker::Ticker;
