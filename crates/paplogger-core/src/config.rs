//! Facade configuration.
//!
//! Everything the facade needs at construction time. The values can come
//! from code (`with_*` builders), a JSON document, or environment overrides.

use serde::{Deserialize, Serialize};

use crate::error::LoggerResult;
use crate::level::Level;
use crate::sink::{SyslogTransport, DEFAULT_SYSLOG_PORT};

/// Environment variable overriding the initial level.
pub const ENV_LEVEL: &str = "PAPLOG_LEVEL";

/// Environment variable overriding the rotation period.
pub const ENV_ROTATION: &str = "PAPLOG_ROTATION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Logger name in the registry; `None` is the root logger
    pub name: Option<String>,

    /// Initial level
    pub level: Level,

    /// Force the rich console format at every level
    pub verbose_format: bool,

    /// Tag log file name and content with the host name
    pub log_file_with_hostname: bool,

    /// Rotation period token (`S`, `M`, `H`, `D`, `MIDNIGHT`, `W0`..`W6`)
    pub rotation_period: String,

    /// Rotated files to keep (0 keeps all)
    pub backup_count: usize,

    pub syslog_port: u16,

    pub syslog_transport: SyslogTransport,

    /// Host name override for file prefixes and formats
    pub hostname: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: None,
            level: Level::Warning,
            verbose_format: false,
            log_file_with_hostname: false,
            rotation_period: "D".to_string(),
            backup_count: 15,
            syslog_port: DEFAULT_SYSLOG_PORT,
            syslog_transport: SyslogTransport::Udp,
            hostname: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_verbose_format(mut self, verbose: bool) -> Self {
        self.verbose_format = verbose;
        self
    }

    pub fn with_log_file_with_hostname(mut self, enabled: bool) -> Self {
        self.log_file_with_hostname = enabled;
        self
    }

    /// Set the rotation period token and the number of rotated files kept.
    ///
    /// The token is validated when a file sink is created.
    pub fn with_rotation(mut self, period: impl Into<String>, backup_count: usize) -> Self {
        self.rotation_period = period.into();
        self.backup_count = backup_count;
        self
    }

    pub fn with_syslog_port(mut self, port: u16) -> Self {
        self.syslog_port = port;
        self
    }

    pub fn with_syslog_transport(mut self, transport: SyslogTransport) -> Self {
        self.syslog_transport = transport;
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> LoggerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `PAPLOG_LEVEL` and `PAPLOG_ROTATION` when they are set.
    pub fn with_env_overrides(self) -> LoggerResult<Self> {
        self.with_overrides(
            std::env::var(ENV_LEVEL).ok().as_deref(),
            std::env::var(ENV_ROTATION).ok().as_deref(),
        )
    }

    fn with_overrides(mut self, level: Option<&str>, rotation: Option<&str>) -> LoggerResult<Self> {
        if let Some(level) = level.filter(|v| !v.trim().is_empty()) {
            self.level = level.parse()?;
        }
        if let Some(rotation) = rotation.filter(|v| !v.trim().is_empty()) {
            self.rotation_period = rotation.trim().to_string();
        }
        Ok(self)
    }
}
