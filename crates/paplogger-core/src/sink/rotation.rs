//! Time-based rotation policy for the file sink.
//!
//! Periods use the classic vocabulary: `S`, `M`, `H`, `D`, `MIDNIGHT` and
//! `W0`..`W6` (weekly, Monday = 0). Rotated files are named
//! `<file>.<suffix>` where the suffix is the start of the finished interval.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};

use crate::error::{LoggerError, LoggerResult};

/// How often the file sink starts a new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationPeriod {
    Seconds,
    Minutes,
    Hours,
    Days,
    Midnight,
    /// Weekly, on the given weekday (0 = Monday)
    Weekly(u8),
}

impl RotationPeriod {
    /// Length of one interval.
    pub fn interval(self) -> Duration {
        match self {
            RotationPeriod::Seconds => Duration::seconds(1),
            RotationPeriod::Minutes => Duration::minutes(1),
            RotationPeriod::Hours => Duration::hours(1),
            RotationPeriod::Days | RotationPeriod::Midnight => Duration::days(1),
            RotationPeriod::Weekly(_) => Duration::days(7),
        }
    }

    /// strftime pattern for rotated file suffixes.
    pub fn suffix_format(self) -> &'static str {
        match self {
            RotationPeriod::Seconds => "%Y-%m-%d_%H-%M-%S",
            RotationPeriod::Minutes => "%Y-%m-%d_%H-%M",
            RotationPeriod::Hours => "%Y-%m-%d_%H",
            RotationPeriod::Days | RotationPeriod::Midnight | RotationPeriod::Weekly(_) => {
                "%Y-%m-%d"
            }
        }
    }

    /// First rollover strictly after `from`.
    pub fn next_rollover(self, from: DateTime<Local>) -> DateTime<Local> {
        match self {
            RotationPeriod::Midnight => next_midnight(from, None),
            RotationPeriod::Weekly(day) => next_midnight(from, Some(day)),
            _ => from + self.interval(),
        }
    }

    /// First rollover strictly after `now` on the schedule that had a
    /// rollover due at `anchor`.
    ///
    /// Fixed intervals stay aligned to `anchor` however late `now` is;
    /// midnight and weekly periods are aligned to local midnight already.
    pub fn next_rollover_after(self, anchor: DateTime<Local>, now: DateTime<Local>) -> DateTime<Local> {
        match self {
            RotationPeriod::Midnight | RotationPeriod::Weekly(_) => self.next_rollover(now),
            _ if anchor > now => anchor,
            _ => {
                let step = self.interval().num_milliseconds();
                let steps = (now - anchor).num_milliseconds() / step + 1;
                anchor + Duration::milliseconds(step * steps)
            }
        }
    }

    /// Whether `suffix` parses with this period's suffix format.
    pub fn matches_suffix(self, suffix: &str) -> bool {
        let mut parsed = Parsed::new();
        parse(&mut parsed, suffix, StrftimeItems::new(self.suffix_format())).is_ok()
            && parsed.to_naive_date().is_ok()
    }
}

fn next_midnight(from: DateTime<Local>, weekday: Option<u8>) -> DateTime<Local> {
    let mut date = from.date_naive();
    loop {
        date = match date.succ_opt() {
            Some(next) => next,
            None => return from + Duration::days(1),
        };
        let wanted = weekday.map_or(true, |day| date.weekday().num_days_from_monday() == u32::from(day));
        if wanted {
            return local_midnight(date).unwrap_or_else(|| from + Duration::days(1));
        }
    }
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

impl FromStr for RotationPeriod {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let when = s.trim().to_ascii_uppercase();
        match when.as_str() {
            "S" => Ok(RotationPeriod::Seconds),
            "M" => Ok(RotationPeriod::Minutes),
            "H" => Ok(RotationPeriod::Hours),
            "D" => Ok(RotationPeriod::Days),
            "MIDNIGHT" => Ok(RotationPeriod::Midnight),
            w if w.starts_with('W') => {
                let day = &w[1..];
                if day.len() != 1 {
                    return Err(LoggerError::InvalidRotation(format!(
                        "{s} (weekly rollover needs a day from 0 to 6, 0 is Monday)"
                    )));
                }
                match day.parse::<u8>() {
                    Ok(d) if d <= 6 => Ok(RotationPeriod::Weekly(d)),
                    _ => Err(LoggerError::InvalidRotation(format!(
                        "{s} (invalid day for weekly rollover)"
                    ))),
                }
            }
            _ => Err(LoggerError::InvalidRotation(s.to_string())),
        }
    }
}

impl fmt::Display for RotationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationPeriod::Seconds => f.write_str("S"),
            RotationPeriod::Minutes => f.write_str("M"),
            RotationPeriod::Hours => f.write_str("H"),
            RotationPeriod::Days => f.write_str("D"),
            RotationPeriod::Midnight => f.write_str("MIDNIGHT"),
            RotationPeriod::Weekly(day) => write!(f, "W{day}"),
        }
    }
}

/// Rotation period plus the number of rotated files to keep.
///
/// Fixed when a file sink is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RotationPolicy {
    pub period: RotationPeriod,
    /// Rotated files kept; 0 keeps all of them
    pub backup_count: usize,
}

impl RotationPolicy {
    pub fn new(period: RotationPeriod, backup_count: usize) -> Self {
        Self {
            period,
            backup_count,
        }
    }

    /// Parse a period token and pair it with a backup count.
    pub fn parse(when: &str, backup_count: usize) -> LoggerResult<Self> {
        Ok(Self::new(when.parse()?, backup_count))
    }

    /// Path a file is moved to when the interval starting at `start` ends.
    pub fn rotated_path(&self, path: &Path, start: DateTime<Local>) -> PathBuf {
        let suffix = start.format(self.period.suffix_format());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!("{name}.{suffix}"))
    }

    /// Rotated siblings of `path`, oldest first.
    pub fn rotated_files(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(Vec::new());
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let prefix = format!("{name}.");

        let mut found = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if let Some(suffix) = file_name.strip_prefix(&prefix) {
                if self.period.matches_suffix(suffix) {
                    found.push(entry.path());
                }
            }
        }
        found.sort();
        Ok(found)
    }

    /// Delete rotated files beyond `backup_count`, returning what was removed.
    pub fn prune(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        if self.backup_count == 0 {
            return Ok(Vec::new());
        }
        let files = self.rotated_files(path)?;
        if files.len() <= self.backup_count {
            return Ok(Vec::new());
        }
        let excess = files.len() - self.backup_count;
        let mut removed = Vec::with_capacity(excess);
        for old in files.into_iter().take(excess) {
            fs::remove_file(&old)?;
            removed.push(old);
        }
        Ok(removed)
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::new(RotationPeriod::Days, 15)
    }
}

impl fmt::Display for RotationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} keeping {} logs", self.period, self.backup_count)
    }
}
