//! Log-call handle.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::level::Level;
use crate::record::Record;
use crate::registry::Registry;

/// Cheap, cloneable handle used to emit records through a named logger.
///
/// The plain methods take the module name from the caller's source file,
/// so `logger.info(..)` called from `worker.rs` is shown as `worker`.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    registry: Arc<dyn Registry>,
}

impl Logger {
    pub fn new(name: impl Into<Arc<str>>, registry: Arc<dyn Registry>) -> Self {
        Self {
            name: name.into(),
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current logger threshold in the registry.
    pub fn level(&self) -> Option<Level> {
        self.registry.level(&self.name)
    }

    /// Whether a record at `level` would pass the logger threshold.
    pub fn enabled(&self, level: Level) -> bool {
        self.level().is_some_and(|threshold| level >= threshold)
    }

    /// Emit a record with an explicit target (module path or file).
    pub fn log_at(&self, level: Level, target: &str, message: impl Into<String>) {
        let record = Record::new(level, target, message);
        self.registry.dispatch(&self.name, &record);
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.log_at(level, Location::caller().file(), message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::Critical, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Emit a record at a level, tagged with the calling module path.
#[macro_export]
macro_rules! pap_log {
    ($logger:expr, $lvl:expr, $($arg:tt)*) => {{
        $logger.log_at($lvl, module_path!(), format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! pap_debug {
    ($logger:expr, $($arg:tt)*) => { $crate::pap_log!($logger, $crate::Level::Debug, $($arg)*) };
}

#[macro_export]
macro_rules! pap_info {
    ($logger:expr, $($arg:tt)*) => { $crate::pap_log!($logger, $crate::Level::Info, $($arg)*) };
}

#[macro_export]
macro_rules! pap_warning {
    ($logger:expr, $($arg:tt)*) => { $crate::pap_log!($logger, $crate::Level::Warning, $($arg)*) };
}

#[macro_export]
macro_rules! pap_error {
    ($logger:expr, $($arg:tt)*) => { $crate::pap_log!($logger, $crate::Level::Error, $($arg)*) };
}

#[macro_export]
macro_rules! pap_critical {
    ($logger:expr, $($arg:tt)*) => { $crate::pap_log!($logger, $crate::Level::Critical, $($arg)*) };
}
