//! Demo Driver Integration Tests
//!
//! These tests run the demo binary end-to-end against a temporary log
//! directory and a local syslog address.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// Demo command logging into a temporary directory
fn demo_cmd(log_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("paplogger-demo").expect("Failed to find paplogger-demo binary");
    cmd.arg("--log-path")
        .arg(log_dir.path())
        .arg("--syslog-host")
        .arg("127.0.0.1")
        .arg("--unknown-host")
        .arg("no-such-host.invalid")
        .env_remove("PAPLOG_LEVEL")
        .env_remove("PAPLOG_ROTATION");
    cmd
}

// ============================================================================
// Help Tests
// ============================================================================

#[test]
fn test_help_lists_options() {
    Command::cargo_bin("paplogger-demo")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pret-a-porter logger demo"))
        .stdout(predicate::str::contains("--verbose-fmt"))
        .stdout(predicate::str::contains("--log-path"))
        .stdout(predicate::str::contains("--syslog-host"));
}

// ============================================================================
// Demo Run Tests
// ============================================================================

#[test]
fn test_demo_walks_every_level() {
    let log_dir = TempDir::new().unwrap();

    demo_cmd(&log_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("LEVEL SET TO DEBUG (10)"))
        .stdout(predicate::str::contains("LEVEL SET TO CRITICAL (50)"))
        .stdout(predicate::str::contains("Could not connect to syslog on no-such-host.invalid"));
}

#[test]
fn test_demo_writes_plain_and_tagged_log_files() {
    let log_dir = TempDir::new().unwrap();

    demo_cmd(&log_dir).assert().success();

    let plain = log_dir.path().join("pap_logger_example.log");
    let content = std::fs::read_to_string(&plain).unwrap();
    assert!(content.contains("Hello from pap_logger_example"));
    assert!(content.contains("without hostname"));
    assert!(!content.contains("remove log file"));

    let tagged: Vec<_> = std::fs::read_dir(log_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with("_pap_logger_example.log"))
        .collect();
    assert_eq!(tagged.len(), 1);

    let tagged_content = std::fs::read_to_string(log_dir.path().join(&tagged[0])).unwrap();
    assert!(tagged_content.contains("with hostname"));
}

#[test]
fn test_demo_verbose_format_above_warning() {
    let log_dir = TempDir::new().unwrap();

    demo_cmd(&log_dir)
        .arg("--verbose-fmt")
        .assert()
        .success()
        .stdout(predicate::str::contains("[CRITICAL] main : verbose"));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_demo_rejects_file_as_log_path() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("plain-file");
    std::fs::write(&not_a_dir, "x").unwrap();

    Command::cargo_bin("paplogger-demo")
        .unwrap()
        .arg("--log-path")
        .arg(&not_a_dir)
        .env_remove("PAPLOG_LEVEL")
        .assert()
        .failure()
        .stdout(predicate::str::contains("is not a directory"));
}

#[test]
fn test_demo_rejects_invalid_config() {
    let log_dir = TempDir::new().unwrap();
    let config = log_dir.path().join("logger.json");
    std::fs::write(&config, "{\"level\": \"LOUD\"}").unwrap();

    demo_cmd(&log_dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_demo_reads_config() {
    let log_dir = TempDir::new().unwrap();
    let config = log_dir.path().join("logger.json");
    std::fs::write(&config, "{\"name\": \"demo\", \"backup_count\": 3}").unwrap();

    demo_cmd(&log_dir)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello from pap_logger_example"));
}
