//! PapLogger core: a configurable logging facade.
//!
//! A [`PapLogger`] drives one named logger in a [`Registry`] and keeps up to
//! three sinks consistent with a handful of settings:
//!
//! - a console sink, always present, whose format gets richer at verbose
//!   levels
//! - an optional rotating file sink, optionally tagged with the host name
//! - an optional remote syslog sink, fixed at WARNING
//!
//! Records are emitted through a [`Logger`] handle, the `pap_*` macros, or
//! `tracing` events bridged with [`FacadeLayer`].

pub mod config;
pub mod error;
pub mod facade;
pub mod format;
pub mod host;
pub mod layer;
pub mod level;
pub mod logger;
pub mod record;
pub mod registry;
pub mod sink;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use facade::{Attachment, PapLogger};
pub use format::{console_format, file_format, FormatContext, FormatKind, RICH_CONSOLE_CEILING};
pub use layer::FacadeLayer;
pub use level::Level;
pub use logger::Logger;
pub use record::Record;
pub use registry::{LoggerRegistry, Registry, ROOT_LOGGER};
pub use sink::{
    CaptureBuffer, ConsoleSink, RotatingFileSink, RotationPeriod, RotationPolicy, SharedSink,
    Sink, SinkId, SinkKind, SyslogSink, SyslogTransport, DEFAULT_SYSLOG_PORT,
};
