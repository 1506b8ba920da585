//! crates/logging/src/level.rs
//! Severity levels used for gating and rendering log lines.

use std::fmt;
use std::str::FromStr;

/// Severity of a log message.
///
/// Variants are declared in priority order so the derived [`Ord`] matches
/// [`LogLevel::priority`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogLevel {
    /// Chatty diagnostics, priority 2.
    Verbose,
    /// Developer diagnostics, priority 3.
    Debug,
    /// Normal operational messages, priority 4.
    Info,
    /// Recoverable problems, priority 5.
    Warn,
    /// Failures, priority 6. The default gate.
    #[default]
    Error,
    /// Conditions that should never happen, priority 7.
    Assert,
}

impl LogLevel {
    /// Every level, lowest priority first.
    pub const ALL: [Self; 6] = [
        Self::Verbose,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Assert,
    ];

    /// Returns the numeric priority used for gating.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Verbose => 2,
            Self::Debug => 3,
            Self::Info => 4,
            Self::Warn => 5,
            Self::Error => 6,
            Self::Assert => 7,
        }
    }

    /// Returns the single letter shown in rendered lines.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Verbose => 'V',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
            Self::Assert => 'A',
        }
    }

    /// Returns the stable lowercase name used for configuration lookup.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Verbose => "verbose",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Assert => "assert",
        }
    }

    /// Looks a level up by its canonical name.
    ///
    /// ```
    /// use logging::LogLevel;
    ///
    /// assert_eq!(LogLevel::from_name("warn"), Some(LogLevel::Warn));
    /// assert_eq!(LogLevel::from_name("WARN"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.name() == name)
    }

    /// Looks a level up by its display letter.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.letter() == letter)
    }

    /// Looks a level up by the first character of `letter`.
    ///
    /// Only the first character is inspected; an empty string has no match.
    ///
    /// ```
    /// use logging::LogLevel;
    ///
    /// assert_eq!(LogLevel::from_letter_str("Debugging"), Some(LogLevel::Debug));
    /// assert_eq!(LogLevel::from_letter_str(""), None);
    /// ```
    #[must_use]
    pub fn from_letter_str(letter: &str) -> Option<Self> {
        letter.chars().next().and_then(Self::from_letter)
    }

    /// Reports whether a message at `self` passes a gate set to `gate`.
    #[must_use]
    pub const fn is_at_least(self, gate: Self) -> bool {
        self.priority() >= gate.priority()
    }

    pub(crate) const fn from_priority(priority: u8) -> Option<Self> {
        match priority {
            2 => Some(Self::Verbose),
            3 => Some(Self::Debug),
            4 => Some(Self::Info),
            5 => Some(Self::Warn),
            6 => Some(Self::Error),
            7 => Some(Self::Assert),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no [`LogLevel`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{input}' (expected one of verbose, debug, info, warn, error, assert or V/D/I/W/E/A)")]
pub struct ParseLevelError {
    input: String,
}

impl ParseLevelError {
    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    /// Accepts a canonical name or a single display letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let single_letter = match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter.to_ascii_uppercase()),
            _ => None,
        };

        single_letter
            .or_else(|| Self::from_name(&trimmed.to_ascii_lowercase()))
            .ok_or_else(|| ParseLevelError {
                input: s.to_owned(),
            })
    }
}
