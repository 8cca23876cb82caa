use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogEvent`](crate::event::LogEvent).
///
/// Variants are declared from least to most severe, so the derived
/// ordering gives `Debug < Info < Warning < Error < Fatal < Panic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Panic,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Fatal,
        Level::Panic,
    ];

    /// Lowercase text form written into formatted output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
        }
    }

    /// First four characters of the text form, uppercased.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Level::Debug => "DEBU",
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Error => "ERRO",
            Level::Fatal => "FATA",
            Level::Panic => "PANI",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by [`Level::from_str`] for unrecognised names.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("not a valid log level: {0:?}")]
pub struct LevelParseError(pub String);

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "panic" => Ok(Level::Panic),
            _ => Err(LevelParseError(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            Level::Error
        } else if level == tracing::Level::WARN {
            Level::Warning
        } else if level == tracing::Level::INFO {
            Level::Info
        } else {
            // DEBUG and TRACE
            Level::Debug
        }
    }
}
