//! Edge case and boundary condition tests
//!
//! These tests verify the facade handles absent values, bad configuration
//! and hostile environments without panicking, and keeps working afterwards.

use std::fs;
use std::sync::Arc;

use paplogger_core::{
    Attachment, CaptureBuffer, FormatContext, Level, LoggerConfig, LoggerError, LoggerRegistry,
    PapLogger, Registry, Sink, ROOT_LOGGER,
};
use tempfile::TempDir;

fn registry(buffer: &CaptureBuffer) -> Arc<LoggerRegistry> {
    Arc::new(LoggerRegistry::capturing(
        buffer.clone(),
        FormatContext::new("box01", "UTC"),
    ))
}

fn capturing_facade(config: LoggerConfig) -> (PapLogger, CaptureBuffer) {
    let buffer = CaptureBuffer::new();
    let pap = PapLogger::with_registry(registry(&buffer), config.with_hostname("box01")).unwrap();
    (pap, buffer)
}

// ============================================================================
// Absent Value Tests
// ============================================================================

/// An empty path is the same as no path
#[test]
fn test_empty_log_file_path() {
    let (mut pap, _) = capturing_facade(LoggerConfig::new());

    assert!(matches!(pap.set_log_file(Some("")), Attachment::Detached));
    assert!(pap.log_file().is_none());
    assert!(pap.file_sink().is_none());
}

/// Blank host names are the same as no host
#[test]
fn test_blank_syslog_host() {
    let (mut pap, _) = capturing_facade(LoggerConfig::new());

    assert!(matches!(pap.set_syslog_host(Some("  ")), Attachment::Detached));
    assert!(pap.syslog_host().is_none());
    assert!(pap.remote_sink().is_none());
}

/// Removing sinks that were never attached is a no-op
#[test]
fn test_detach_when_nothing_attached() {
    let (mut pap, buffer) = capturing_facade(LoggerConfig::new());
    buffer.clear();

    assert!(matches!(pap.set_log_file(None::<&str>), Attachment::Detached));
    assert!(matches!(pap.set_syslog_host(None::<&str>), Attachment::Detached));
    assert!(buffer.contents().is_empty());
    assert_eq!(pap.registry().sinks(ROOT_LOGGER).len(), 1);
}

/// Toggling hostname tagging without a log file only flips the flag
#[test]
fn test_hostname_toggle_without_log_file() {
    let (mut pap, _) = capturing_facade(LoggerConfig::new());

    assert!(matches!(pap.set_log_file_with_hostname(true), Attachment::Detached));
    assert!(pap.log_file_with_hostname());
    assert!(pap.log_file().is_none());

    // The flag now applies to the next file
    let temp = TempDir::new().unwrap();
    assert!(pap.set_log_file(Some(temp.path().join("app.log"))).is_attached());
    assert_eq!(
        pap.file_sink().unwrap().format(),
        paplogger_core::FormatKind::LogFileWithHost
    );
}

/// Setting the same flag twice does not rename twice
#[test]
fn test_hostname_toggle_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let (mut pap, _) = capturing_facade(LoggerConfig::new());
    assert!(pap.set_log_file(Some(temp.path().join("app.log"))).is_attached());

    assert!(pap.set_log_file_with_hostname(true).is_attached());
    assert!(pap.set_log_file_with_hostname(true).is_attached());
    assert_eq!(pap.log_file(), Some(temp.path().join("box01_app.log").as_path()));
}

// ============================================================================
// Configuration Error Tests
// ============================================================================

/// A bad rotation token fails the file sink but not the facade
#[test]
fn test_invalid_rotation_period() {
    let temp = TempDir::new().unwrap();
    let (mut pap, buffer) = capturing_facade(LoggerConfig::new().with_rotation("fortnightly", 3));

    let outcome = pap.set_log_file(Some(temp.path().join("app.log")));
    assert!(matches!(outcome.error(), Some(LoggerError::InvalidRotation(_))));
    assert!(pap.file_sink().is_none());
    assert!(buffer.contains("Invalid rolling interval specified: fortnightly"));

    // Fixing the policy attaches the sink on the remembered path
    assert!(pap.set_rotation("H", 3).is_attached());
    assert_eq!(pap.rotation(), ("H", 3));
    assert!(pap.file_sink().is_some());
}

/// Changing the rotation without a file only stores it
#[test]
fn test_set_rotation_without_log_file() {
    let (mut pap, _) = capturing_facade(LoggerConfig::new());

    assert!(matches!(pap.set_rotation("W6", 2), Attachment::Detached));
    assert_eq!(pap.rotation(), ("W6", 2));
}

/// The registry must provide a console sink
#[test]
fn test_missing_console_sink_is_fatal() {
    let registry = Arc::new(LoggerRegistry::bare(FormatContext::new("box01", "UTC")));
    let err = PapLogger::with_registry(registry, LoggerConfig::new().with_name("svc")).unwrap_err();

    assert!(matches!(err, LoggerError::NoConsoleSink(ref name) if name == "svc"));
    assert!(err.to_string().contains("No console sink"));
}

// ============================================================================
// Environment Error Tests
// ============================================================================

/// A log file under a regular file cannot be opened
#[test]
fn test_log_file_under_regular_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let (mut pap, buffer) = capturing_facade(LoggerConfig::new());
    let outcome = pap.set_log_file(Some(blocker.join("app.log")));

    assert!(outcome.is_failed());
    assert!(pap.file_sink().is_none());
    assert!(buffer.contains("Could not create app.log in"));

    // Console output is unaffected
    pap.logger().error("still here");
    assert!(buffer.contains("still here"));
}

/// Moving the log file onto a directory keeps the current file
#[test]
fn test_move_log_file_onto_directory() {
    let temp = TempDir::new().unwrap();
    let current = temp.path().join("a.log");
    let taken = temp.path().join("taken");
    fs::create_dir(&taken).unwrap();

    let (mut pap, buffer) = capturing_facade(LoggerConfig::new());
    assert!(pap.set_log_file(Some(&current)).is_attached());

    let outcome = pap.set_log_file(Some(&taken));
    assert!(matches!(outcome.error(), Some(LoggerError::OpenFile { .. })));
    assert!(buffer.contains("Could not create taken in"));
    assert_eq!(pap.log_file(), Some(current.as_path()));
    assert_eq!(pap.file_sink().unwrap().path(), current);

    pap.logger().error("after failed move");
    assert!(fs::read_to_string(&current).unwrap().contains("after failed move"));
}

/// Unwritable directories are reported as permission errors
#[cfg(unix)]
#[test]
fn test_permission_denied_directory() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let locked = temp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users ignore the mode bits
    if fs::write(locked.join("probe"), "x").is_ok() {
        return;
    }

    let (mut pap, buffer) = capturing_facade(LoggerConfig::new());
    let outcome = pap.set_log_file(Some(locked.join("sub").join("app.log")));

    assert!(outcome.error().is_some_and(LoggerError::is_permission_denied));
    assert!(buffer.contains("Could not create app.log in"));
    assert!(buffer.contains(": Permission Denied"));

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Unresolvable hosts never panic
#[test]
fn test_unknown_syslog_host() {
    let (mut pap, buffer) = capturing_facade(LoggerConfig::new().with_syslog_port(5514));

    let outcome = pap.set_syslog_host(Some("no-such-host.invalid"));
    assert!(matches!(outcome.error(), Some(LoggerError::Remote { port: 5514, .. })));
    assert_eq!(pap.syslog_host(), Some("no-such-host.invalid"));
    assert!(pap.remote_sink().is_none());
    assert!(buffer.contains("[   ERROR]"));
}

// ============================================================================
// Registry Sharing Tests
// ============================================================================

/// Named facades leave the root logger alone
#[test]
fn test_named_logger_is_isolated() {
    let buffer = CaptureBuffer::new();
    let registry = registry(&buffer);
    let mut pap =
        PapLogger::with_registry(registry.clone(), LoggerConfig::new().with_name("svc")).unwrap();
    pap.set_level(Level::Debug);

    assert_eq!(pap.name(), "svc");
    assert_eq!(registry.level("svc"), Some(Level::Debug));
    assert_eq!(registry.level(ROOT_LOGGER), None);
}

/// A second facade on the same logger reuses its console sink
#[test]
fn test_facade_recreated_on_same_logger() {
    let temp = TempDir::new().unwrap();
    let buffer = CaptureBuffer::new();
    let registry = registry(&buffer);

    let console_id = {
        let mut pap = PapLogger::with_registry(registry.clone(), LoggerConfig::new()).unwrap();
        assert!(pap.set_log_file(Some(temp.path().join("app.log"))).is_attached());
        pap.console_sink().id()
    };
    assert_eq!(registry.sinks(ROOT_LOGGER).len(), 1);

    let pap = PapLogger::with_registry(registry.clone(), LoggerConfig::new()).unwrap();
    assert_eq!(pap.console_sink().id(), console_id);
}
