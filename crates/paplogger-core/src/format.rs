//! Output formats and the console format selection rule.
//!
//! Every sink renders records through one of four fixed templates. The
//! mapping from [`FormatKind`] to template is a `match`, so the set of formats
//! is closed and checked at compile time.
//!
//! Placeholders:
//!
//! | placeholder    | value                                      |
//! |----------------|--------------------------------------------|
//! | `{asctime}`    | local time, `%Y-%m-%d %H:%M:%S`            |
//! | `{msecs}`      | milliseconds, three digits                 |
//! | `{tz}`         | timezone name of the format context        |
//! | `{levelname}`  | level name right-aligned in eight columns  |
//! | `{hostname}`   | host name of the format context            |
//! | `{module}`     | short module name of the record            |
//! | `{message}`    | record message                             |

use std::fmt::{self, Write as FmtWrite};

use serde::{Deserialize, Serialize};

use crate::host;
use crate::level::Level;
use crate::record::Record;

/// Highest level at which the console still uses the rich format.
///
/// The boundary is inclusive: at WARNING the console is rich, at ERROR and
/// CRITICAL it is terse unless the verbose flag forces the rich format.
pub const RICH_CONSOLE_CEILING: Level = Level::Warning;

const ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The four output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// Timestamp with milliseconds, timezone, level, module, message
    LogFile,
    /// `LogFile` plus the host name
    LogFileWithHost,
    /// Level, module, message (the collector adds its own timestamp)
    Syslog,
    /// Timestamp, timezone, message
    Simple,
}

impl FormatKind {
    /// Template string for this format.
    pub const fn template(self) -> &'static str {
        match self {
            FormatKind::LogFile => "{asctime}.{msecs} {tz} [{levelname}] {module} : {message}",
            FormatKind::LogFileWithHost => {
                "{asctime}.{msecs} {tz} [{levelname}] ({hostname}) {module} : {message}"
            }
            FormatKind::Syslog => "[{levelname}] {module} : {message}",
            FormatKind::Simple => "{asctime} {tz} : {message}",
        }
    }

    /// Short name used in diagnostic records.
    pub const fn name(self) -> &'static str {
        match self {
            FormatKind::LogFile => "logfile",
            FormatKind::LogFileWithHost => "logfile_with_host",
            FormatKind::Syslog => "syslog",
            FormatKind::Simple => "simple",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Console format for a level and verbose flag.
pub fn console_format(level: Level, verbose: bool) -> FormatKind {
    if verbose || level <= RICH_CONSOLE_CEILING {
        FormatKind::LogFile
    } else {
        FormatKind::Simple
    }
}

/// File format for the hostname-tagging flag.
pub fn file_format(with_hostname: bool) -> FormatKind {
    if with_hostname {
        FormatKind::LogFileWithHost
    } else {
        FormatKind::LogFile
    }
}

/// Per-process fields shared by all records: host name and timezone name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatContext {
    pub hostname: String,
    pub timezone: String,
}

impl FormatContext {
    /// Context for the current machine.
    pub fn detect() -> Self {
        Self {
            hostname: host::hostname(),
            timezone: host::timezone_name(),
        }
    }

    pub fn new(hostname: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            timezone: timezone.into(),
        }
    }

    /// Render a record with the given format.
    pub fn render(&self, kind: FormatKind, record: &Record) -> String {
        let template = kind.template();
        let mut out = String::with_capacity(template.len() + record.message.len() + 32);
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            self.push_field(&mut out, &after[..end], record);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }

    fn push_field(&self, out: &mut String, name: &str, record: &Record) {
        let _ = match name {
            "asctime" => write!(out, "{}", record.timestamp.format(ASCTIME_FORMAT)),
            "msecs" => write!(out, "{:03}", record.timestamp.timestamp_subsec_millis() % 1000),
            "tz" => write!(out, "{}", self.timezone),
            "levelname" => write!(out, "{:>8}", record.level),
            "hostname" => write!(out, "{}", self.hostname),
            "module" => write!(out, "{}", record.module),
            "message" => write!(out, "{}", record.message),
            other => write!(out, "{{{}}}", other),
        };
    }
}

impl Default for FormatContext {
    fn default() -> Self {
        Self::detect()
    }
}
