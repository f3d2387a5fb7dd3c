//! The logger facade.
//!
//! [`PapLogger`] owns up to three sinks on one named logger and keeps them
//! consistent whenever a setting changes:
//!
//! ```text
//! setting              console   file             remote
//! ───────────────────  ────────  ───────────────  ─────────────
//! set_level            format,   threshold,       address
//!                      level     format, target
//! set_verbose_format   format    -                -
//! set_log_file         -         create / update  -
//!                                / destroy
//! set_log_file_with_   -         rename target,   -
//!   hostname                     format
//! set_syslog_host      -         -                create / update
//!                                                 / destroy
//! set_syslog_port      -         -                address
//! ```
//!
//! Setters that create sinks never fail the caller: an environment problem
//! (permissions, bad rotation token, unknown host) is logged as one ERROR
//! record and returned as [`Attachment::Failed`], and the facade keeps
//! working with the sinks it still has.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LoggerConfig;
use crate::error::{LoggerError, LoggerResult};
use crate::format::{console_format, file_format};
use crate::host;
use crate::level::Level;
use crate::logger::Logger;
use crate::registry::{LoggerRegistry, Registry, ROOT_LOGGER};
use crate::sink::{
    RotatingFileSink, RotationPolicy, SharedSink, Sink, SinkKind, SinkSlot, SyslogSink,
    SyslogTransport,
};

/// Outcome of a setter that may create or destroy a sink.
#[must_use]
#[derive(Debug)]
pub enum Attachment {
    /// The sink is attached and reflects the new setting
    Attached,
    /// No sink of this kind is attached
    Detached,
    /// The sink could not be created or updated; the error was also logged
    Failed(LoggerError),
}

impl Attachment {
    pub fn is_attached(&self) -> bool {
        matches!(self, Attachment::Attached)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Attachment::Failed(_))
    }

    pub fn error(&self) -> Option<&LoggerError> {
        match self {
            Attachment::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Logger with a console sink and optional rotating-file and syslog sinks.
///
/// ```ignore
/// use paplogger_core::{Level, LoggerConfig, PapLogger};
///
/// let mut pap = PapLogger::new(LoggerConfig::default())?;
/// pap.set_level(Level::Debug);
/// let _ = pap.set_log_file(Some("/tmp/app/app.log"));
/// let _ = pap.set_syslog_host(Some("logs.example.net"));
///
/// let logger = pap.logger();
/// logger.info("ready");
/// ```
pub struct PapLogger {
    registry: Arc<dyn Registry>,
    logger: Logger,
    hostname: String,

    level: Level,
    verbose_format: bool,
    log_file_with_hostname: bool,
    rotation_period: String,
    backup_count: usize,
    log_file: Option<PathBuf>,
    syslog_host: Option<String>,
    syslog_port: u16,
    syslog_transport: SyslogTransport,

    console: SharedSink,
    file: SinkSlot<RotatingFileSink>,
    remote: SinkSlot<SyslogSink>,
}

impl PapLogger {
    /// Facade on the process-wide registry.
    pub fn new(config: LoggerConfig) -> LoggerResult<Self> {
        Self::with_registry(LoggerRegistry::global(), config)
    }

    /// Facade on an injected registry.
    ///
    /// Fails with [`LoggerError::NoConsoleSink`] when the registry does not
    /// provide a console sink for the logger.
    pub fn with_registry(registry: Arc<dyn Registry>, config: LoggerConfig) -> LoggerResult<Self> {
        let name = config.name.unwrap_or_else(|| ROOT_LOGGER.to_string());
        registry.register(&name);

        let console = registry
            .sinks(&name)
            .into_iter()
            .find(|sink| sink.kind() == SinkKind::Console)
            .ok_or_else(|| LoggerError::NoConsoleSink(name.clone()))?;

        let facade = Self {
            logger: Logger::new(name.as_str(), registry.clone()),
            registry,
            hostname: config.hostname.unwrap_or_else(host::hostname),
            level: config.level,
            verbose_format: config.verbose_format,
            log_file_with_hostname: config.log_file_with_hostname,
            rotation_period: config.rotation_period,
            backup_count: config.backup_count,
            log_file: None,
            syslog_host: None,
            syslog_port: config.syslog_port,
            syslog_transport: config.syslog_transport,
            console,
            file: SinkSlot::Detached,
            remote: SinkSlot::Detached,
        };

        facade.update_console_format();
        facade.update_logger_level();
        facade.update_console_level();
        Ok(facade)
    }

    /// Handle for emitting records through this facade's logger.
    pub fn logger(&self) -> Logger {
        self.logger.clone()
    }

    pub fn name(&self) -> &str {
        self.logger.name()
    }

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    /// Host name used for file prefixes.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Change the level and bring every attached sink in line with it.
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
        self.update_console_format();
        self.update_logger_level();
        self.update_console_level();
        let _ = self.update_remote_sink();
        if let Err(e) = self.update_file_sink() {
            if let Some(path) = self.log_file.clone() {
                self.report_file_error(&path, &e);
            }
        }
    }

    pub fn verbose_format(&self) -> bool {
        self.verbose_format
    }

    /// Force (or stop forcing) the rich console format. Other sinks are not
    /// affected.
    pub fn set_verbose_format(&mut self, verbose: bool) {
        self.verbose_format = verbose;
        self.update_console_format();
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Attach, move or detach the rotating file sink.
    ///
    /// `None` or an empty path detaches it. Missing parent directories are
    /// created.
    pub fn set_log_file<P: Into<PathBuf>>(&mut self, path: Option<P>) -> Attachment {
        let path = path
            .map(Into::into)
            .filter(|p: &PathBuf| !p.as_os_str().is_empty());

        let Some(path) = path else {
            self.remove_file_sink();
            self.log_file = None;
            return Attachment::Detached;
        };

        if let Some(previous) = self.log_file.as_ref().filter(|previous| **previous != path) {
            self.logger.debug(format!(
                "Changing log file from {} to {}",
                previous.display(),
                path.display()
            ));
        }
        self.log_file = Some(path.clone());

        let result = ensure_parent_dir(&path).and_then(|()| self.update_file_sink());
        if let Err(e) = result {
            self.report_file_error(&path, &e);
            // An attached sink is still writing its previous file
            if let Some(file) = self.file.get() {
                self.log_file = Some(file.path());
            }
            return Attachment::Failed(e);
        }

        if self.file.is_attached() {
            Attachment::Attached
        } else {
            self.add_file_sink(&path)
        }
    }

    pub fn log_file_with_hostname(&self) -> bool {
        self.log_file_with_hostname
    }

    /// Toggle host name tagging of the log file.
    ///
    /// With a log file set, `<hostname>_` is added to or stripped from its
    /// file name and the file sink switches between the host-annotated and
    /// plain formats. Without one only the flag changes.
    pub fn set_log_file_with_hostname(&mut self, enabled: bool) -> Attachment {
        if enabled == self.log_file_with_hostname {
            return self.file_attachment();
        }

        let outcome = match self.log_file.clone() {
            Some(path) => {
                let renamed = if enabled {
                    with_host_prefix(&path, &self.hostname)
                } else {
                    without_host_prefix(&path, &self.hostname)
                };
                self.set_log_file(Some(renamed))
            }
            None => Attachment::Detached,
        };
        if outcome.is_failed() && self.file.is_attached() {
            return outcome;
        }

        self.log_file_with_hostname = enabled;
        self.update_file_format();
        outcome
    }

    /// Rotation policy tokens used for the next file sink.
    pub fn rotation(&self) -> (&str, usize) {
        (&self.rotation_period, self.backup_count)
    }

    /// Change the rotation policy.
    ///
    /// A file sink's policy is fixed at creation, so an attached sink is
    /// detached and recreated on the same path.
    pub fn set_rotation(&mut self, period: impl Into<String>, backup_count: usize) -> Attachment {
        self.rotation_period = period.into();
        self.backup_count = backup_count;

        match self.log_file.clone() {
            Some(path) => {
                self.remove_file_sink();
                self.set_log_file(Some(path))
            }
            None => Attachment::Detached,
        }
    }

    pub fn syslog_host(&self) -> Option<&str> {
        self.syslog_host.as_deref()
    }

    /// Attach, redirect or detach the syslog sink.
    ///
    /// `None` or an empty host detaches it. The remote sink always keeps a
    /// WARNING threshold, whatever the facade level.
    pub fn set_syslog_host<S: Into<String>>(&mut self, host: Option<S>) -> Attachment {
        let host = host
            .map(Into::into)
            .filter(|h: &String| !h.trim().is_empty());

        let Some(host) = host else {
            self.remove_remote_sink();
            self.syslog_host = None;
            return Attachment::Detached;
        };

        self.syslog_host = Some(host.clone());
        if self.remote.is_attached() {
            return match self.update_remote_sink() {
                Ok(()) => Attachment::Attached,
                Err(e) => Attachment::Failed(e),
            };
        }
        self.add_remote_sink(&host)
    }

    pub fn syslog_port(&self) -> u16 {
        self.syslog_port
    }

    pub fn set_syslog_port(&mut self, port: u16) {
        self.syslog_port = port;
        let _ = self.update_remote_sink();
    }

    pub fn syslog_transport(&self) -> SyslogTransport {
        self.syslog_transport
    }

    pub fn console_sink(&self) -> &SharedSink {
        &self.console
    }

    pub fn file_sink(&self) -> Option<&Arc<RotatingFileSink>> {
        self.file.get()
    }

    pub fn remote_sink(&self) -> Option<&Arc<SyslogSink>> {
        self.remote.get()
    }

    fn file_attachment(&self) -> Attachment {
        if self.file.is_attached() {
            Attachment::Attached
        } else {
            Attachment::Detached
        }
    }

    fn update_console_format(&self) {
        let kind = console_format(self.level, self.verbose_format);
        if self.console.format() != kind {
            self.console.set_format(kind);
            self.logger.debug(format!("Changing console format to {kind}"));
        }
    }

    fn update_logger_level(&self) {
        if self.registry.level(self.logger.name()) != Some(self.level) {
            self.registry.set_level(self.logger.name(), self.level);
            self.logger
                .debug(format!("Logging with global level {}", self.level));
        }
    }

    fn update_console_level(&self) {
        if self.console.threshold() != self.level {
            self.console.set_threshold(self.level);
            self.logger
                .debug(format!("Console logging with level {}", self.level));
        }
    }

    /// Push the collector address to an attached remote sink. On failure the
    /// sink and the recorded address stay on the previous collector.
    fn update_remote_sink(&mut self) -> LoggerResult<()> {
        let (Some(remote), Some(host)) = (self.remote.get(), self.syslog_host.as_deref()) else {
            return Ok(());
        };
        let port = self.syslog_port;
        if let Err(e) = remote.set_address(host, port) {
            self.logger
                .error(format!("Could not connect to syslog on {host}:{port}"));
            let (host, port) = remote.address();
            self.syslog_host = Some(host);
            self.syslog_port = port;
            return Err(e);
        }
        Ok(())
    }

    fn update_file_format(&self) {
        if let Some(file) = self.file.get() {
            let kind = file_format(self.log_file_with_hostname);
            if file.format() != kind {
                file.set_format(kind);
            }
        }
    }

    fn update_file_sink(&self) -> LoggerResult<()> {
        let Some(file) = self.file.get() else {
            return Ok(());
        };
        if file.threshold() != self.level {
            file.set_threshold(self.level);
            self.logger
                .debug(format!("Logging with rotating file level {}", self.level));
        }
        self.update_file_format();
        if let Some(path) = self.log_file.as_ref() {
            file.repoint(path)?;
        }
        Ok(())
    }

    fn add_file_sink(&mut self, path: &Path) -> Attachment {
        let policy = match RotationPolicy::parse(&self.rotation_period, self.backup_count) {
            Ok(policy) => policy,
            Err(e) => {
                self.logger.error(format!("Rotating file sink : {e}"));
                return Attachment::Failed(e);
            }
        };

        let sink = match RotatingFileSink::open(
            path,
            policy,
            self.level,
            file_format(self.log_file_with_hostname),
        ) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                self.report_file_error(path, &e);
                return Attachment::Failed(e);
            }
        };

        self.registry.add_sink(self.logger.name(), sink.clone());
        self.file.attach(sink);
        self.logger.debug(format!(
            "Added rotating file sink to {} with level {}.",
            path.display(),
            self.level
        ));
        self.logger.debug(format!(
            "Log rotates every {} and keeps {} logs.",
            policy.period, policy.backup_count
        ));
        Attachment::Attached
    }

    fn remove_file_sink(&mut self) {
        if self.file.is_attached() {
            self.logger.debug("Removing rotating file sink");
        }
        if let Some(sink) = self.file.detach() {
            self.registry.remove_sink(self.logger.name(), sink.id());
            sink.close();
        }
    }

    fn add_remote_sink(&mut self, host: &str) -> Attachment {
        let port = self.syslog_port;
        match SyslogSink::connect(host, port, self.syslog_transport) {
            Ok(sink) => {
                let sink = Arc::new(sink);
                self.registry.add_sink(self.logger.name(), sink.clone());
                let threshold = sink.threshold();
                self.remote.attach(sink);
                self.logger.debug(format!(
                    "Added syslog sink to {host}:{port} with level {threshold}."
                ));
                Attachment::Attached
            }
            Err(e) => {
                self.logger
                    .error(format!("Could not connect to syslog on {host}:{port}"));
                Attachment::Failed(e)
            }
        }
    }

    fn remove_remote_sink(&mut self) {
        if self.remote.is_attached() {
            self.logger.debug("Removing syslog sink");
        }
        if let Some(sink) = self.remote.detach() {
            self.registry.remove_sink(self.logger.name(), sink.id());
            sink.close();
        }
    }

    fn report_file_error(&self, path: &Path, error: &LoggerError) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        if error.is_permission_denied() {
            self.logger.error(format!(
                "Could not create {name} in {}: Permission Denied",
                dir.display()
            ));
        } else {
            self.logger
                .error(format!("Could not create {name} in {}: {error}", dir.display()));
        }
    }
}

impl Drop for PapLogger {
    fn drop(&mut self) {
        if let Some(sink) = self.file.detach() {
            self.registry.remove_sink(self.logger.name(), sink.id());
            sink.close();
        }
        if let Some(sink) = self.remote.detach() {
            self.registry.remove_sink(self.logger.name(), sink.id());
            sink.close();
        }
    }
}

impl fmt::Debug for PapLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PapLogger")
            .field("name", &self.logger.name())
            .field("level", &self.level)
            .field("verbose_format", &self.verbose_format)
            .field("log_file", &self.log_file)
            .field("log_file_with_hostname", &self.log_file_with_hostname)
            .field("syslog_host", &self.syslog_host)
            .field("syslog_port", &self.syslog_port)
            .field("file", &self.file)
            .field("remote", &self.remote)
            .finish()
    }
}

fn ensure_parent_dir(path: &Path) -> LoggerResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir).map_err(|source| LoggerError::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// `dir/name` -> `dir/<host>_name`
fn with_host_prefix(path: &Path, hostname: &str) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(format!("{hostname}_{}", name.to_string_lossy())),
        None => path.to_path_buf(),
    }
}

/// `dir/<host>_name` -> `dir/name`
fn without_host_prefix(path: &Path, hostname: &str) -> PathBuf {
    let prefix = format!("{hostname}_");
    match path.file_name().map(|n| n.to_string_lossy().into_owned()) {
        Some(name) => match name.strip_prefix(&prefix) {
            Some(stripped) if !stripped.is_empty() => path.with_file_name(stripped),
            _ => path.to_path_buf(),
        },
        None => path.to_path_buf(),
    }
}
