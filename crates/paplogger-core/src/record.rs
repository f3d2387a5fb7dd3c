//! Log record passed from a logger to its sinks.

use std::path::Path;

use chrono::{DateTime, Local};

use crate::level::Level;

/// A single log event.
///
/// Records are created by [`Logger`](crate::Logger) on the calling thread and
/// rendered once per attached sink.
#[derive(Debug, Clone)]
pub struct Record {
    /// Severity of the event
    pub level: Level,

    /// Where the event came from (module path or source file)
    pub target: String,

    /// Short module name shown in rich formats (e.g. "facade")
    pub module: String,

    /// Human-readable message
    pub message: String,

    /// Local time the record was created
    pub timestamp: DateTime<Local>,
}

impl Record {
    /// Create a record stamped with the current local time.
    ///
    /// The short module name is derived from `target`: the file stem for
    /// source paths, the last segment for `a::b::c` module paths.
    pub fn new(level: Level, target: impl Into<String>, message: impl Into<String>) -> Self {
        let target = target.into();
        let module = short_module(&target);
        Self {
            level,
            target,
            module,
            message: message.into(),
            timestamp: Local::now(),
        }
    }

    /// Override the timestamp (tests and replays).
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

fn short_module(target: &str) -> String {
    if target.ends_with(".rs") {
        return Path::new(target)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(target)
            .to_string();
    }
    target.rsplit("::").next().unwrap_or(target).to_string()
}
