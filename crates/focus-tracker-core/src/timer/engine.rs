//! Timer engine implementation.
//!
//! The engine is a pure countdown state machine. It owns no thread and no
//! clock: the caller (see [`crate::runtime::TimerRuntime`]) invokes `tick()`
//! once per elapsed second while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! (mode, paused) --start--> (mode, running) --pause--> (mode, paused)
//! (mode, running) --tick x N--> completion --policy--> (next mode, paused)
//! any --reset--> (mode, paused, full duration)
//! any --switch_mode(m)--> (m, paused, full duration)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(DurationConfig::default());
//! engine.start();
//! // Once per second:
//! if let Some(Event::SessionCompleted { .. }) = engine.tick() { /* record */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::{DurationConfig, Mode};
use super::policy;
use crate::events::Event;

/// Observable state of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: Mode,
    pub remaining_secs: u64,
    pub running: bool,
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    durations: DurationConfig,
    mode: Mode,
    remaining_secs: u64,
    running: bool,
}

impl TimerEngine {
    /// Create a paused engine in Focus mode at the configured focus length.
    pub fn new(durations: DurationConfig) -> Self {
        Self {
            durations,
            mode: Mode::Focus,
            remaining_secs: durations.get(Mode::Focus),
            running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        TimerState {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            running: self.running,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn durations(&self) -> DurationConfig {
        self.durations
    }

    /// Configured length of the current mode.
    pub fn total_secs(&self) -> u64 {
        self.durations.get(self.mode)
    }

    /// 0.0 .. 1.0 progress within the current countdown.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - (self.remaining_secs as f64 / total as f64)).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            progress: self.progress(),
            display: format_clock(self.remaining_secs),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        tracing::debug!(mode = %self.mode, remaining = self.remaining_secs, "timer started");
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        tracing::debug!(mode = %self.mode, remaining = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Start when paused, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.remaining_secs = self.total_secs();
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Enter `mode` paused at its full duration. Progress of a running
    /// countdown is discarded and never recorded.
    pub fn switch_mode(&mut self, mode: Mode) -> Event {
        let from = self.mode;
        let interrupted = self.running;
        self.enter(mode);
        if interrupted {
            tracing::debug!(%from, to = %mode, "running countdown discarded by mode switch");
        }
        Event::ModeSwitched {
            from,
            to: mode,
            remaining_secs: self.remaining_secs,
            interrupted,
            at: Utc::now(),
        }
    }

    /// Advance one second. Returns `Some(Event::SessionCompleted)` when the
    /// countdown has run out; by then the engine is already paused in the
    /// next mode, so later ticks return `None` until `start()`.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
        }
        if self.remaining_secs == 0 {
            return Some(self.complete());
        }
        None
    }

    /// Install new durations. A paused countdown is resynced to the new
    /// length of its mode; a running one keeps counting down untouched.
    pub fn apply_durations(&mut self, durations: DurationConfig) -> Event {
        self.durations = durations;
        let resynced = !self.running;
        if resynced {
            self.remaining_secs = self.total_secs();
        }
        Event::DurationsUpdated {
            durations,
            resynced,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> Event {
        let mode = self.mode;
        let duration_secs = self.total_secs();
        self.running = false;
        let transition = policy::next(mode);
        self.enter(transition.next);
        tracing::debug!(%mode, next = %transition.next, "countdown completed");
        Event::SessionCompleted {
            mode,
            duration_secs,
            next_mode: transition.next,
            celebratory: transition.celebratory,
            at: Utc::now(),
        }
    }

    fn enter(&mut self, mode: Mode) {
        self.mode = mode;
        self.remaining_secs = self.durations.get(mode);
        self.running = false;
    }
}

/// `MM:SS`, minutes unbounded.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(engine: &mut TimerEngine, n: u64) -> Vec<Event> {
        (0..n).filter_map(|_| engine.tick()).collect()
    }

    #[test]
    fn start_pause_toggle() {
        let mut engine = TimerEngine::new(DurationConfig::default());
        assert!(!engine.is_running());

        assert!(engine.start().is_some());
        assert!(engine.is_running());
        assert!(engine.start().is_none(), "already running");

        assert!(engine.pause().is_some());
        assert!(!engine.is_running());
        assert!(engine.pause().is_none(), "already paused");

        engine.toggle();
        assert!(engine.is_running());
        engine.toggle();
        assert!(!engine.is_running());
    }

    #[test]
    fn ticks_only_count_while_running() {
        let mut engine = TimerEngine::new(DurationConfig::default());
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 1500);

        engine.start();
        run_ticks(&mut engine, 10);
        assert_eq!(engine.remaining_secs(), 1490);

        engine.pause();
        run_ticks(&mut engine, 10);
        assert_eq!(engine.remaining_secs(), 1490);
    }

    #[test]
    fn full_focus_countdown_completes_once_into_short_break() {
        let mut engine = TimerEngine::new(DurationConfig::default());
        engine.start();

        let events = run_ticks(&mut engine, 1500);
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::SessionCompleted {
                mode,
                duration_secs,
                next_mode,
                celebratory,
                ..
            } => {
                assert_eq!(*mode, Mode::Focus);
                assert_eq!(*duration_secs, 1500);
                assert_eq!(*next_mode, Mode::ShortBreak);
                assert!(*celebratory);
            }
            other => panic!("Expected SessionCompleted, got {other:?}"),
        }

        assert_eq!(
            engine.state(),
            TimerState {
                mode: Mode::ShortBreak,
                remaining_secs: 300,
                running: false,
            }
        );
        assert!(run_ticks(&mut engine, 100).is_empty());
    }

    #[test]
    fn break_completion_returns_to_focus() {
        let mut engine = TimerEngine::new(DurationConfig::new(60, 3, 5));
        engine.switch_mode(Mode::LongBreak);
        engine.start();
        let events = run_ticks(&mut engine, 5);
        assert!(matches!(
            events.as_slice(),
            [Event::SessionCompleted {
                mode: Mode::LongBreak,
                duration_secs: 5,
                next_mode: Mode::Focus,
                celebratory: false,
                ..
            }]
        ));
        assert_eq!(engine.mode(), Mode::Focus);
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut engine = TimerEngine::new(DurationConfig::default());
        engine.start();
        run_ticks(&mut engine, 42);

        engine.reset();
        let once = engine.state();
        engine.reset();
        assert_eq!(engine.state(), once);
        assert_eq!(once.remaining_secs, 1500);
        assert!(!once.running);
    }

    #[test]
    fn switching_mode_mid_countdown_discards_progress() {
        let mut engine = TimerEngine::new(DurationConfig::default());
        engine.start();
        let events = run_ticks(&mut engine, 700);
        assert!(events.is_empty());
        assert_eq!(engine.remaining_secs(), 800);

        match engine.switch_mode(Mode::LongBreak) {
            Event::ModeSwitched {
                from,
                to,
                interrupted,
                remaining_secs,
                ..
            } => {
                assert_eq!(from, Mode::Focus);
                assert_eq!(to, Mode::LongBreak);
                assert!(interrupted);
                assert_eq!(remaining_secs, 900);
            }
            other => panic!("Expected ModeSwitched, got {other:?}"),
        }
        assert!(!engine.is_running());

        engine.switch_mode(Mode::Focus);
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn durations_resync_only_while_paused() {
        let mut engine = TimerEngine::new(DurationConfig::default());
        engine.apply_durations(DurationConfig::from_minutes(50, 10, 20));
        assert_eq!(engine.remaining_secs(), 3000);

        engine.start();
        engine.tick();
        let event = engine.apply_durations(DurationConfig::from_minutes(30, 5, 15));
        assert!(matches!(event, Event::DurationsUpdated { resynced: false, .. }));
        assert_eq!(engine.remaining_secs(), 2999);

        engine.switch_mode(Mode::ShortBreak);
        assert_eq!(engine.remaining_secs(), 300);
        engine.reset();
        engine.switch_mode(Mode::Focus);
        assert_eq!(engine.remaining_secs(), 1800);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::new(DurationConfig::default());
        match engine.snapshot() {
            Event::StateSnapshot {
                mode,
                running,
                remaining_secs,
                display,
                progress,
                ..
            } => {
                assert_eq!(mode, Mode::Focus);
                assert!(!running);
                assert_eq!(remaining_secs, 1500);
                assert_eq!(display, "25:00");
                assert_eq!(progress, 0.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn clock_format_pads_and_keeps_minutes_unbounded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(125 * 60), "125:00");
    }
}
