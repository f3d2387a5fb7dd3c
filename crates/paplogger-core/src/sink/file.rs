//! Rotating log file sink.
//!
//! The sink appends to a single file and, when the rotation period elapses,
//! moves it aside as `<file>.<suffix>` and starts a fresh one. The file can
//! be repointed to another name at runtime; the rotation policy cannot.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use super::rotation::RotationPolicy;
use super::{Sink, SinkKind, SinkSettings};
use crate::error::{LoggerError, LoggerResult};
use crate::format::FormatKind;
use crate::level::Level;

/// File sink with time-based rotation.
pub struct RotatingFileSink {
    settings: SinkSettings,
    policy: RotationPolicy,
    state: Mutex<FileState>,
}

struct FileState {
    /// Current target file
    path: PathBuf,

    /// Open stream, `None` after `close` until the next line
    writer: Option<BufWriter<File>>,

    /// When the current file is moved aside
    rollover_at: DateTime<Local>,
}

impl RotatingFileSink {
    /// Open (or create) `path` for appending.
    ///
    /// The parent directory must already exist.
    pub fn open(
        path: impl Into<PathBuf>,
        policy: RotationPolicy,
        threshold: Level,
        format: FormatKind,
    ) -> LoggerResult<Self> {
        let path = path.into();
        let writer = open_append(&path).map_err(|source| LoggerError::OpenFile {
            path: path.clone(),
            source,
        })?;
        let rollover_at = policy.period.next_rollover(last_write(&path));

        Ok(Self {
            settings: SinkSettings::new(SinkKind::File, threshold, format),
            policy,
            state: Mutex::new(FileState {
                path,
                writer: Some(writer),
                rollover_at,
            }),
        })
    }

    /// Current target file.
    pub fn path(&self) -> PathBuf {
        self.state.lock().path.clone()
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// When the current file will be rotated.
    pub fn rollover_at(&self) -> DateTime<Local> {
        self.state.lock().rollover_at
    }

    /// Switch to `path`, opening it before the current stream is closed.
    ///
    /// When `path` cannot be opened the sink keeps writing to its current
    /// file.
    pub fn repoint(&self, path: impl Into<PathBuf>) -> LoggerResult<()> {
        let path = path.into();
        let mut state = self.state.lock();
        if state.path == path {
            return Ok(());
        }
        let writer = open_append(&path).map_err(|source| LoggerError::OpenFile {
            path: path.clone(),
            source,
        })?;
        if let Some(mut previous) = state.writer.replace(writer) {
            let _ = previous.flush();
        }
        state.rollover_at = self.policy.period.next_rollover(last_write(&path));
        state.path = path;
        Ok(())
    }

    /// Rotate immediately, returning where the previous file was moved.
    pub fn rotate(&self) -> io::Result<Option<PathBuf>> {
        let mut state = self.state.lock();
        let now = Local::now();
        self.rollover(&mut state, now)
    }

    fn rollover(&self, state: &mut FileState, now: DateTime<Local>) -> io::Result<Option<PathBuf>> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush()?;
        }

        let start = std::cmp::min(state.rollover_at, now) - self.policy.period.interval();
        let mut moved = None;
        if state.path.exists() {
            let dest = self.policy.rotated_path(&state.path, start);
            if dest.exists() {
                fs::remove_file(&dest)?;
            }
            fs::rename(&state.path, &dest)?;
            tracing::debug!(from = %state.path.display(), to = %dest.display(), "rotated log file");
            moved = Some(dest);
        }

        match self.policy.prune(&state.path) {
            Ok(removed) if !removed.is_empty() => {
                tracing::debug!(count = removed.len(), "removed old rotated log files");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "failed to prune rotated log files"),
        }

        state.rollover_at = self.policy.period.next_rollover_after(state.rollover_at, now);
        Ok(moved)
    }
}

impl Sink for RotatingFileSink {
    fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    fn write_line(&self, _level: Level, line: &str) -> io::Result<()> {
        let mut state = self.state.lock();

        let now = Local::now();
        if now >= state.rollover_at {
            if let Err(e) = self.rollover(&mut state, now) {
                tracing::warn!(path = %state.path.display(), error = %e, "log file rotation failed");
                state.rollover_at = self.policy.period.next_rollover_after(state.rollover_at, now);
            }
        }

        if state.writer.is_none() {
            state.writer = Some(open_append(&state.path)?);
        }
        let Some(writer) = state.writer.as_mut() else {
            return Ok(());
        };
        writeln!(writer, "{}", line)?;
        writer.flush()
    }

    fn close(&self) {
        if let Some(mut writer) = self.state.lock().writer.take() {
            let _ = writer.flush();
        }
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RotatingFileSink")
            .field("settings", &self.settings)
            .field("policy", &self.policy)
            .field("path", &state.path)
            .field("open", &state.writer.is_some())
            .finish()
    }
}

fn open_append(path: &Path) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// Modification time of an existing file, or now.
fn last_write(path: &Path) -> DateTime<Local> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now())
}
