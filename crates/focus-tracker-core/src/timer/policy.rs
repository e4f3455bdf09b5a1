//! What comes after a completed countdown.
//!
//! Every focus block is followed by a short break and every break by focus.
//! Consecutive focus blocks are not counted, so a long break is only ever
//! entered by switching to it manually.

use super::mode::Mode;

/// Next mode to enter and whether the completion deserves a celebration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Mode,
    pub celebratory: bool,
}

pub fn next(completed: Mode) -> Transition {
    match completed {
        Mode::Focus => Transition {
            next: Mode::ShortBreak,
            celebratory: true,
        },
        Mode::ShortBreak | Mode::LongBreak => Transition {
            next: Mode::Focus,
            celebratory: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_is_followed_by_short_break() {
        let t = next(Mode::Focus);
        assert_eq!(t.next, Mode::ShortBreak);
        assert!(t.celebratory);
    }

    #[test]
    fn breaks_return_to_focus_quietly() {
        for mode in [Mode::ShortBreak, Mode::LongBreak] {
            let t = next(mode);
            assert_eq!(t.next, Mode::Focus);
            assert!(!t.celebratory);
        }
    }

    #[test]
    fn repeated_focus_never_escalates_to_long_break() {
        let mut mode = Mode::Focus;
        for _ in 0..10 {
            mode = next(mode).next;
            assert_ne!(mode, Mode::LongBreak);
            mode = next(mode).next;
        }
    }
}
