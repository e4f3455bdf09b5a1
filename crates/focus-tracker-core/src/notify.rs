//! Completion signals for whatever renders notifications.
//!
//! The core never plays sounds or shows toasts; it hands a
//! [`CompletionSignal`] to a [`Notifier`] and moves on.

use crate::timer::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSignal {
    /// A focus block finished. Celebrate.
    FocusCompleted { duration_secs: u64 },
    /// A short or long break finished.
    BreakCompleted { mode: Mode, duration_secs: u64 },
}

impl CompletionSignal {
    pub fn for_completion(mode: Mode, duration_secs: u64) -> Self {
        match mode {
            Mode::Focus => Self::FocusCompleted { duration_secs },
            Mode::ShortBreak | Mode::LongBreak => Self::BreakCompleted {
                mode,
                duration_secs,
            },
        }
    }

    pub fn is_celebratory(&self) -> bool {
        matches!(self, Self::FocusCompleted { .. })
    }

    /// User-facing line for the notification.
    pub fn message(&self) -> &'static str {
        match self {
            Self::FocusCompleted { .. } => "Focus session complete! Take a break.",
            Self::BreakCompleted { .. } => "Focus time! Let's get back to work.",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, signal: CompletionSignal);
}

/// Discards every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _signal: CompletionSignal) {}
}

/// Writes every signal to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, signal: CompletionSignal) {
        tracing::info!(celebratory = signal.is_celebratory(), "{}", signal.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_is_the_only_celebration() {
        let focus = CompletionSignal::for_completion(Mode::Focus, 1500);
        assert!(focus.is_celebratory());
        assert_eq!(focus.message(), "Focus session complete! Take a break.");

        for mode in [Mode::ShortBreak, Mode::LongBreak] {
            let signal = CompletionSignal::for_completion(mode, 300);
            assert!(!signal.is_celebratory());
            assert_eq!(
                signal,
                CompletionSignal::BreakCompleted {
                    mode,
                    duration_secs: 300
                }
            );
        }
    }
}
