//! Logging setup for the sadpanda binary
//!
//! Every run writes a fresh log file named after its start time, plus
//! human-facing output on stderr. `RUST_LOG` overrides both filters.

use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILE_FILTER: &str = "sadpanda=info";
const VERBOSE_FILTER: &str = "sadpanda=debug";
const LOG_NAME_FORMAT: &str = "%Y-%m-%d %H-%M-%S.log";

/// How chatty logging should be and where the file goes
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub verbose: bool,
    pub quiet: bool,
    /// Directory for log files; the platform cache dir when unset
    pub log_dir: Option<PathBuf>,
}

/// Log file name for a run started at `started`
#[must_use]
pub fn log_file_name(started: DateTime<Local>) -> String {
    started.format(LOG_NAME_FORMAT).to_string()
}

/// Directory used when [`LogConfig::log_dir`] is unset
#[must_use]
pub fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("sadpanda")
        .join("logs")
}

/// Install the global subscriber and return the path of the log file
///
/// # Errors
///
/// Returns an I/O error if the log file cannot be created or a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<PathBuf> {
    let dir = config.log_dir.clone().unwrap_or_else(default_log_dir);
    let path = create_log_file_path(&dir)?;
    let file = File::create(&path)?;

    let file_default = if config.verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILE_FILTER
    };
    let console_default = if config.quiet {
        "error"
    } else if config.verbose {
        VERBOSE_FILTER
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true)
                .with_filter(env_filter(file_default)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(env_filter(console_default)),
        )
        .try_init()
        .map_err(io::Error::other)?;

    Ok(path)
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn create_log_file_path(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    Ok(dir.join(log_file_name(Local::now())))
}
