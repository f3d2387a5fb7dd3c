//! PapLogger demo driver
//!
//! Walks every level through the facade's settings: log file, hostname
//! tagging, syslog forwarding and verbose console format.
//!
//! ## Usage
//!
//! ```bash
//! # Log to /tmp/pap_logger_example/pap_logger_example.log
//! paplogger-demo
//!
//! # Forward WARNING and above to a local collector
//! paplogger-demo --syslog-host 127.0.0.1
//!
//! # Start from a JSON configuration
//! paplogger-demo --config logger.json --log-path ./logs
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use paplogger_core::{Level, Logger, LoggerConfig, PapLogger};

const EXAMPLE_NAME: &str = "pap_logger_example";

/// Pret-a-porter logger demo
#[derive(Parser)]
#[command(name = "paplogger-demo")]
#[command(version = "0.1.0")]
#[command(about = "Pret-a-porter logger demo")]
struct Cli {
    /// Verbose formatting
    #[arg(short, long = "verbose-fmt")]
    verbose_fmt: bool,

    /// Path to log directory
    #[arg(short = 'p', long, default_value_os_t = default_log_path())]
    log_path: PathBuf,

    /// Syslog hostname
    #[arg(short, long, default_value = "hostname-with-a-syslog-listening.invalid")]
    syslog_host: String,

    /// Syslog hostname that does not resolve
    #[arg(long, default_value = "this-is-an-unknown.invalid")]
    unknown_host: String,

    /// JSON logger configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Install the subscriber for the crate's own diagnostics (stderr).
fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Default log directory ($TMPDIR/pap_logger_example)
fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(EXAMPLE_NAME)
}

fn load_config(path: Option<&Path>) -> Result<LoggerConfig> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            LoggerConfig::from_json(&json)
                .with_context(|| format!("Invalid configuration in {}", path.display()))?
        }
        None => LoggerConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn log_in_all_levels(logger: &Logger, msg: &str) {
    logger.debug(msg);
    logger.info(msg);
    logger.warning(msg);
    logger.error(msg);
    logger.critical(msg);
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?.with_verbose_format(cli.verbose_fmt);
    let mut pap = PapLogger::new(config)?;
    let logger = pap.logger();

    if cli.log_path.exists() && !cli.log_path.is_dir() {
        let msg = format!("{} is not a directory", cli.log_path.display());
        logger.critical(&msg);
        bail!(msg);
    }

    let log_file = cli.log_path.join(format!("{EXAMPLE_NAME}.log"));

    for level in Level::ALL {
        pap.set_level(level);
        let _ = pap.set_log_file(Some(&log_file));
        let _ = pap.set_syslog_host(Some(cli.syslog_host.as_str()));
        pap.set_verbose_format(false);

        log_in_all_levels(&logger, "");
        log_in_all_levels(&logger, &format!("LEVEL SET TO {level} ({})", level.value()));
        log_in_all_levels(&logger, &format!("Hello from {EXAMPLE_NAME}"));

        let _ = pap.set_log_file_with_hostname(true);
        log_in_all_levels(&logger, "with hostname");
        let _ = pap.set_log_file_with_hostname(false);
        log_in_all_levels(&logger, "without hostname");

        let _ = pap.set_syslog_host(Some(cli.unknown_host.as_str()));
        log_in_all_levels(&logger, "unknown Syslog");
        let _ = pap.set_syslog_host(None::<&str>);
        log_in_all_levels(&logger, "remove Syslog");

        let _ = pap.set_log_file(None::<&Path>);
        log_in_all_levels(&logger, "remove log file");

        if level >= Level::Warning {
            pap.set_verbose_format(true);
            log_in_all_levels(&logger, "verbose");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging();

    run(cli)
}
