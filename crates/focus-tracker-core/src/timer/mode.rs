use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Countdown category. Serialized with the display names used in the
/// persisted session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "Focus")]
    Focus,
    #[serde(rename = "Short Break")]
    ShortBreak,
    #[serde(rename = "Long Break")]
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Focus)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    /// Accepts display names as well as kebab/snake-case forms
    /// (`focus`, `short-break`, `long_break`, `short`, `long`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match norm.as_str() {
            "focus" => Ok(Mode::Focus),
            "shortbreak" | "short" => Ok(Mode::ShortBreak),
            "longbreak" | "long" => Ok(Mode::LongBreak),
            _ => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("unknown mode '{s}'"),
            }),
        }
    }
}

/// Configured countdown length per mode, in seconds.
///
/// Stored globally (not per account), so every account on one device shares
/// the same timer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    #[serde(rename = "Focus")]
    pub focus: u64,
    #[serde(rename = "Short Break")]
    pub short_break: u64,
    #[serde(rename = "Long Break")]
    pub long_break: u64,
}

impl DurationConfig {
    pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
    pub const DEFAULT_SHORT_BREAK_SECS: u64 = 5 * 60;
    pub const DEFAULT_LONG_BREAK_SECS: u64 = 15 * 60;

    pub fn new(focus: u64, short_break: u64, long_break: u64) -> Self {
        Self {
            focus,
            short_break,
            long_break,
        }
    }

    /// Build from whole minutes, the unit the settings form edits in.
    pub fn from_minutes(focus: u64, short_break: u64, long_break: u64) -> Self {
        Self::new(
            focus.saturating_mul(60),
            short_break.saturating_mul(60),
            long_break.saturating_mul(60),
        )
    }

    pub fn get(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Focus => self.focus,
            Mode::ShortBreak => self.short_break,
            Mode::LongBreak => self.long_break,
        }
    }

    /// Every duration must be a positive number of seconds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for mode in Mode::ALL {
            if self.get(mode) == 0 {
                return Err(ValidationError::InvalidValue {
                    field: mode.label().into(),
                    message: "duration must be a positive number of seconds".into(),
                });
            }
        }
        Ok(())
    }
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_FOCUS_SECS,
            Self::DEFAULT_SHORT_BREAK_SECS,
            Self::DEFAULT_LONG_BREAK_SECS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let cfg = DurationConfig::default();
        assert_eq!(cfg.get(Mode::Focus), 1500);
        assert_eq!(cfg.get(Mode::ShortBreak), 300);
        assert_eq!(cfg.get(Mode::LongBreak), 900);
    }

    #[test]
    fn serializes_with_display_names() {
        let json = serde_json::to_value(DurationConfig::default()).unwrap();
        assert_eq!(json["Focus"], 1500);
        assert_eq!(json["Short Break"], 300);
        assert_eq!(json["Long Break"], 900);
        assert_eq!(
            serde_json::to_string(&Mode::ShortBreak).unwrap(),
            "\"Short Break\""
        );
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("focus".parse::<Mode>().unwrap(), Mode::Focus);
        assert_eq!("short-break".parse::<Mode>().unwrap(), Mode::ShortBreak);
        assert_eq!("Long Break".parse::<Mode>().unwrap(), Mode::LongBreak);
        assert_eq!("long".parse::<Mode>().unwrap(), Mode::LongBreak);
        assert!("nap".parse::<Mode>().is_err());
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(DurationConfig::new(0, 300, 900).validate().is_err());
        assert!(DurationConfig::from_minutes(1, 1, 1).validate().is_ok());
    }
}
