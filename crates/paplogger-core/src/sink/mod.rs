//! Output sinks.
//!
//! A sink receives already-rendered lines from the registry. Each sink owns
//! its own severity threshold and format, kept in [`SinkSettings`] so the
//! facade can push new values without knowing the concrete sink type.
//!
//! ```text
//! Logger ──► Registry::dispatch ──► ConsoleSink   (stdout)
//!                                ├─► RotatingFileSink (<dir>/<name>.log)
//!                                └─► SyslogSink   (udp|tcp host:514)
//! ```

pub mod console;
pub mod file;
pub mod rotation;
pub mod syslog;

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::format::FormatKind;
use crate::level::Level;

pub use console::{CaptureBuffer, ConsoleSink};
pub use file::RotatingFileSink;
pub use rotation::{RotationPeriod, RotationPolicy};
pub use syslog::{SyslogSink, SyslogTransport, DEFAULT_SYSLOG_PORT};

/// Which of the three outputs a sink is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Console,
    File,
    Remote,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SinkKind::Console => "console",
            SinkKind::File => "file",
            SinkKind::Remote => "remote",
        })
    }
}

/// Process-unique sink identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(u64);

impl SinkId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SinkId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Threshold and format shared by every sink implementation.
#[derive(Debug)]
pub struct SinkSettings {
    id: SinkId,
    kind: SinkKind,
    state: Mutex<(Level, FormatKind)>,
}

impl SinkSettings {
    pub fn new(kind: SinkKind, threshold: Level, format: FormatKind) -> Self {
        Self {
            id: SinkId::next(),
            kind,
            state: Mutex::new((threshold, format)),
        }
    }
}

/// A destination for rendered log lines.
pub trait Sink: Send + Sync {
    fn settings(&self) -> &SinkSettings;

    /// Write one rendered line. Implementations flush before returning.
    fn write_line(&self, level: Level, line: &str) -> io::Result<()>;

    /// Release the underlying stream. Sinks that can reopen do so lazily on
    /// the next line.
    fn close(&self);

    fn id(&self) -> SinkId {
        self.settings().id
    }

    fn kind(&self) -> SinkKind {
        self.settings().kind
    }

    fn threshold(&self) -> Level {
        self.settings().state.lock().0
    }

    fn set_threshold(&self, level: Level) {
        self.settings().state.lock().0 = level;
    }

    fn format(&self) -> FormatKind {
        self.settings().state.lock().1
    }

    fn set_format(&self, format: FormatKind) {
        self.settings().state.lock().1 = format;
    }

    /// Whether a record at `level` passes this sink's threshold.
    fn admits(&self, level: Level) -> bool {
        level >= self.threshold()
    }
}

/// Sink handle as stored in a registry.
pub type SharedSink = Arc<dyn Sink>;

/// Attachment state of an optional sink owned by the facade.
#[derive(Debug)]
pub enum SinkSlot<S> {
    Detached,
    Attached(Arc<S>),
}

impl<S> Default for SinkSlot<S> {
    fn default() -> Self {
        SinkSlot::Detached
    }
}

impl<S> SinkSlot<S> {
    /// Attach a sink, returning the previously attached one (if any).
    pub fn attach(&mut self, sink: Arc<S>) -> Option<Arc<S>> {
        match std::mem::replace(self, SinkSlot::Attached(sink)) {
            SinkSlot::Attached(previous) => Some(previous),
            SinkSlot::Detached => None,
        }
    }

    /// Detach and return the sink, leaving the slot empty.
    pub fn detach(&mut self) -> Option<Arc<S>> {
        match std::mem::take(self) {
            SinkSlot::Attached(sink) => Some(sink),
            SinkSlot::Detached => None,
        }
    }

    pub fn get(&self) -> Option<&Arc<S>> {
        match self {
            SinkSlot::Attached(sink) => Some(sink),
            SinkSlot::Detached => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, SinkSlot::Attached(_))
    }
}
