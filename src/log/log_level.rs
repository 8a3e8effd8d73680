use std::{convert::Infallible, fmt, str::FromStr};

/// Name returned for ordinals that do not map to a [`Level`].
pub const UNKNOWN_LEVEL_NAME: &str = "UNKNOWN";

/// Defines the severity levels for log messages, ordered from least to most severe.
///
/// `Off` is a threshold-only sentinel: it is never the severity of a message,
/// and using it as a logger threshold suppresses every line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Designates fine-grained informational events that are most useful to debug an application.
    Debug = 0,
    /// Designates informational messages that highlight the progress of the application at coarse-grained level.
    #[default]
    Info = 1,
    /// Designates potentially harmful situations.
    Warn = 2,
    /// Designates error events that might still allow the application to continue running.
    Error = 3,
    /// Designates an unrecoverable event. Emitting at this level terminates the process.
    Fatal = 4,
    /// Suppresses all output when used as a threshold.
    Off = 5,
}

impl Level {
    /// Every level, in ascending order of severity.
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Off,
    ];

    /// Canonical uppercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }

    /// Maps an ordinal back to its level, `None` when out of range.
    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Level> {
        match ordinal {
            0 => Some(Level::Debug),
            1 => Some(Level::Info),
            2 => Some(Level::Warn),
            3 => Some(Level::Error),
            4 => Some(Level::Fatal),
            5 => Some(Level::Off),
            _ => None,
        }
    }

    /// Parses a level name, ignoring case and surrounding whitespace.
    ///
    /// Unrecognized input, including the empty string, yields [`Level::Info`].
    /// This never fails.
    #[must_use]
    pub fn parse(text: &str) -> Level {
        let text = text.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(text))
            .unwrap_or(Level::Info)
    }

    /// `false` only for [`Level::Off`], which cannot be the severity of a message.
    #[must_use]
    pub const fn is_emittable(self) -> bool {
        !matches!(self, Level::Off)
    }
}

/// Name for a raw ordinal. Total: out-of-range values map to `"UNKNOWN"`.
#[must_use]
pub const fn level_name(ordinal: u8) -> &'static str {
    match Level::from_ordinal(ordinal) {
        Some(level) => level.name(),
        None => UNKNOWN_LEVEL_NAME,
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Level::parse(s))
    }
}
