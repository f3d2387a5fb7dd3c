//! Error types for the pret-a-porter logger

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for logger configuration and sink lifecycle operations
#[derive(Error, Debug)]
pub enum LoggerError {
    /// The registry has no console sink bound to the logger (fatal at construction)
    #[error("No console sink available for logger '{0}'")]
    NoConsoleSink(String),

    /// A level name or number that does not map to a severity
    #[error("Unknown level: {0}")]
    UnknownLevel(String),

    /// Rotation period outside the accepted vocabulary
    #[error("Invalid rolling interval specified: {0}")]
    InvalidRotation(String),

    /// Parent directory of a log file could not be created
    #[error("Could not create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log file could not be opened for appending
    #[error("Could not open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Syslog collector could not be resolved or connected to
    #[error("Could not connect to syslog on {host}:{port}: {source}")]
    Remote {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Configuration document could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoggerError {
    /// True when the underlying cause is an access-rights failure.
    pub fn is_permission_denied(&self) -> bool {
        let source = match self {
            LoggerError::CreateDirectory { source, .. }
            | LoggerError::OpenFile { source, .. }
            | LoggerError::Remote { source, .. }
            | LoggerError::Io(source) => source,
            _ => return false,
        };
        source.kind() == std::io::ErrorKind::PermissionDenied
    }
}

/// Result type alias using LoggerError
pub type LoggerResult<T> = Result<T, LoggerError>;
