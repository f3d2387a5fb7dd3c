//! Severity levels.
//!
//! Levels are totally ordered `Debug < Info < Warning < Error < Critical` and
//! carry the conventional numeric values 10 to 50, so they can be read from
//! configuration either by name or by number.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoggerError;

/// Severity of a record, and the threshold of a logger or sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Numeric value (DEBUG = 10 ... CRITICAL = 50).
    pub fn value(self) -> u8 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Upper-case name as it appears in formatted records.
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Level for a numeric value, if it is one of the five known values.
    pub fn from_value(value: u8) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.value() == value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u8>() {
            return Level::from_value(value).ok_or_else(|| LoggerError::UnknownLevel(s.to_string()));
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            _ => Err(LoggerError::UnknownLevel(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_matches_values() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].value() < pair[1].value());
        }
    }

    #[test]
    fn test_parse_names_and_numbers() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("Warn".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("40".parse::<Level>().unwrap(), Level::Error);
        assert_eq!(" CRITICAL ".parse::<Level>().unwrap(), Level::Critical);
        assert!(matches!("35".parse::<Level>(), Err(LoggerError::UnknownLevel(_))));
        assert!(matches!("verbose".parse::<Level>(), Err(LoggerError::UnknownLevel(_))));
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(format!("{:>8}", Level::Info), "    INFO");
        assert_eq!(Level::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Debug);
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warning);
    }

    #[test]
    fn test_serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Level::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let parsed: Level = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(parsed, Level::Error);
    }

    #[test]
    fn test_default_is_warning() {
        assert_eq!(Level::default(), Level::Warning);
    }
}
