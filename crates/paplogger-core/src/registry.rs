//! Named-logger registry.
//!
//! The registry is the platform side of the facade: it knows which sinks are
//! attached to which logger, filters records by the logger level and each
//! sink's threshold, and renders records with each sink's format. The facade
//! only talks to it through the [`Registry`] trait, so tests can inject their
//! own registry (for example one with a captured console).

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::format::{FormatContext, FormatKind};
use crate::level::Level;
use crate::record::Record;
use crate::sink::{CaptureBuffer, ConsoleSink, SharedSink, SinkId};

/// Name used for the unnamed logger.
pub const ROOT_LOGGER: &str = "root";

/// Operations the facade needs from a logging registry.
pub trait Registry: Send + Sync {
    /// Create the named logger if it does not exist yet.
    fn register(&self, name: &str);

    /// Sinks currently attached to a logger, in attachment order.
    fn sinks(&self, name: &str) -> Vec<SharedSink>;

    /// Threshold of a logger, `None` if it is not registered.
    fn level(&self, name: &str) -> Option<Level>;

    fn set_level(&self, name: &str, level: Level);

    /// Attach a sink. Attaching a sink that is already attached is a no-op.
    fn add_sink(&self, name: &str, sink: SharedSink);

    /// Detach a sink, returning it if it was attached.
    fn remove_sink(&self, name: &str, id: SinkId) -> Option<SharedSink>;

    /// Deliver a record to every sink that admits it.
    fn dispatch(&self, name: &str, record: &Record);
}

type ConsoleFactory = Box<dyn Fn() -> ConsoleSink + Send + Sync>;

struct LoggerEntry {
    level: Level,
    sinks: Vec<SharedSink>,
}

/// In-process registry.
///
/// A logger registered for the first time gets a console sink at WARNING
/// with the simple format, unless the registry was built with [`bare`].
///
/// [`bare`]: LoggerRegistry::bare
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, LoggerEntry>>,
    context: FormatContext,
    console: Option<ConsoleFactory>,
}

impl LoggerRegistry {
    /// Registry whose loggers print to stdout.
    pub fn new() -> Self {
        Self::with_console(FormatContext::detect(), || {
            ConsoleSink::stdout(Level::Warning, FormatKind::Simple)
        })
    }

    /// Registry whose loggers print to clones of `buffer`.
    pub fn capturing(buffer: CaptureBuffer, context: FormatContext) -> Self {
        Self::with_console(context, move || {
            ConsoleSink::with_writer(buffer.clone(), Level::Warning, FormatKind::Simple)
        })
    }

    /// Registry with a custom console writer per logger.
    pub fn with_console_writer<W, F>(context: FormatContext, make_writer: F) -> Self
    where
        W: Write + Send + 'static,
        F: Fn() -> W + Send + Sync + 'static,
    {
        Self::with_console(context, move || {
            ConsoleSink::with_writer(make_writer(), Level::Warning, FormatKind::Simple)
        })
    }

    /// Registry that registers loggers without any sink.
    pub fn bare(context: FormatContext) -> Self {
        Self {
            loggers: RwLock::new(HashMap::new()),
            context,
            console: None,
        }
    }

    fn with_console(
        context: FormatContext,
        factory: impl Fn() -> ConsoleSink + Send + Sync + 'static,
    ) -> Self {
        Self {
            loggers: RwLock::new(HashMap::new()),
            context,
            console: Some(Box::new(factory)),
        }
    }

    /// Process-wide registry printing to stdout.
    pub fn global() -> Arc<LoggerRegistry> {
        static GLOBAL: OnceLock<Arc<LoggerRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(LoggerRegistry::new())).clone()
    }

    pub fn context(&self) -> &FormatContext {
        &self.context
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for LoggerRegistry {
    fn register(&self, name: &str) {
        let mut loggers = self.loggers.write();
        if loggers.contains_key(name) {
            return;
        }
        let sinks: Vec<SharedSink> = match &self.console {
            Some(factory) => vec![Arc::new(factory()) as SharedSink],
            None => Vec::new(),
        };
        loggers.insert(
            name.to_string(),
            LoggerEntry {
                level: Level::Warning,
                sinks,
            },
        );
    }

    fn sinks(&self, name: &str) -> Vec<SharedSink> {
        self.loggers
            .read()
            .get(name)
            .map(|entry| entry.sinks.clone())
            .unwrap_or_default()
    }

    fn level(&self, name: &str) -> Option<Level> {
        self.loggers.read().get(name).map(|entry| entry.level)
    }

    fn set_level(&self, name: &str, level: Level) {
        if let Some(entry) = self.loggers.write().get_mut(name) {
            entry.level = level;
        }
    }

    fn add_sink(&self, name: &str, sink: SharedSink) {
        let mut loggers = self.loggers.write();
        let Some(entry) = loggers.get_mut(name) else {
            return;
        };
        if entry.sinks.iter().any(|existing| existing.id() == sink.id()) {
            return;
        }
        entry.sinks.push(sink);
    }

    fn remove_sink(&self, name: &str, id: SinkId) -> Option<SharedSink> {
        let mut loggers = self.loggers.write();
        let entry = loggers.get_mut(name)?;
        let index = entry.sinks.iter().position(|sink| sink.id() == id)?;
        Some(entry.sinks.remove(index))
    }

    fn dispatch(&self, name: &str, record: &Record) {
        // Snapshot so sinks write without holding the table lock.
        let sinks = {
            let loggers = self.loggers.read();
            let Some(entry) = loggers.get(name) else {
                return;
            };
            if record.level < entry.level {
                return;
            }
            entry.sinks.clone()
        };

        for sink in sinks.iter().filter(|sink| sink.admits(record.level)) {
            let line = self.context.render(sink.format(), record);
            if let Err(e) = sink.write_line(record.level, &line) {
                tracing::warn!(sink = %sink.kind(), logger = name, error = %e, "failed to emit log record");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Sink, SinkKind};

    fn capturing() -> (LoggerRegistry, CaptureBuffer) {
        let buffer = CaptureBuffer::new();
        let registry = LoggerRegistry::capturing(buffer.clone(), FormatContext::new("box01", "UTC"));
        (registry, buffer)
    }

    #[test]
    fn test_register_attaches_console_once() {
        let (registry, _) = capturing();
        registry.register("app");
        registry.register("app");

        let sinks = registry.sinks("app");
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].kind(), SinkKind::Console);
        assert_eq!(sinks[0].threshold(), Level::Warning);
        assert_eq!(sinks[0].format(), FormatKind::Simple);
        assert_eq!(registry.level("app"), Some(Level::Warning));
        assert_eq!(registry.level("other"), None);
    }

    #[test]
    fn test_bare_registry_has_no_sinks() {
        let registry = LoggerRegistry::bare(FormatContext::new("h", "UTC"));
        registry.register(ROOT_LOGGER);
        assert!(registry.sinks(ROOT_LOGGER).is_empty());
    }

    #[test]
    fn test_dispatch_respects_logger_and_sink_levels() {
        let (registry, buffer) = capturing();
        registry.register("app");

        registry.dispatch("app", &Record::new(Level::Info, "m", "dropped by logger"));
        registry.set_level("app", Level::Debug);
        registry.dispatch("app", &Record::new(Level::Info, "m", "dropped by sink"));
        registry.dispatch("app", &Record::new(Level::Error, "m", "kept"));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("UTC : kept"));
    }

    #[test]
    fn test_add_sink_is_idempotent_and_removable() {
        let (registry, buffer) = capturing();
        registry.register("app");

        let extra: SharedSink = Arc::new(ConsoleSink::with_writer(
            buffer.clone(),
            Level::Debug,
            FormatKind::Syslog,
        ));
        registry.add_sink("app", extra.clone());
        registry.add_sink("app", extra.clone());
        assert_eq!(registry.sinks("app").len(), 2);

        registry.dispatch("app", &Record::new(Level::Warning, "worker", "twice"));
        assert_eq!(buffer.lines().len(), 2);
        assert!(buffer.contains("[ WARNING] worker : twice"));

        let removed = registry.remove_sink("app", extra.id()).unwrap();
        assert_eq!(removed.id(), extra.id());
        assert!(registry.remove_sink("app", extra.id()).is_none());
        assert_eq!(registry.sinks("app").len(), 1);
    }

    #[test]
    fn test_dispatch_to_unknown_logger_is_ignored() {
        let (registry, buffer) = capturing();
        registry.dispatch("missing", &Record::new(Level::Critical, "m", "nobody"));
        assert!(buffer.contents().is_empty());
    }
}
