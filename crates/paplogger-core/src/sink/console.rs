//! Console sink and an in-memory capture writer.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Sink, SinkKind, SinkSettings};
use crate::format::FormatKind;
use crate::level::Level;

/// Sink writing one line per record to standard output (or any writer).
pub struct ConsoleSink {
    settings: SinkSettings,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Console sink on stdout.
    pub fn stdout(threshold: Level, format: FormatKind) -> Self {
        Self::with_writer(io::stdout(), threshold, format)
    }

    /// Console sink on an arbitrary writer.
    pub fn with_writer(
        writer: impl Write + Send + 'static,
        threshold: Level,
        format: FormatKind,
    ) -> Self {
        Self {
            settings: SinkSettings::new(SinkKind::Console, threshold, format),
            out: Mutex::new(Box::new(writer)),
        }
    }
}

impl Sink for ConsoleSink {
    fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    fn write_line(&self, _level: Level, line: &str) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "{}", line)?;
        out.flush()
    }

    fn close(&self) {
        let _ = self.out.lock().flush();
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Cloneable in-memory writer.
///
/// All clones share one buffer, so a test can hand one clone to a sink and
/// read what was written through another.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Written lines, without their terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.contents().contains(text)
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
