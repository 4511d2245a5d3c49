use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Env var holding the log filter, e.g. `TICK_LOG=tick=debug`
pub const LOG_ENV: &str = "TICK_LOG";

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Appender(#[from] InitError),
    #[error("a logger is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log file used by the TUI when none is configured: next to the data file
pub fn default_log_path(data_path: &Path) -> PathBuf {
    data_path.with_extension("log")
}

/// Send logs to `path` (appending) through a background writer. The TUI owns
/// the terminal, so it logs here instead of stderr.
///
/// Lines are flushed when the returned guard drops; hold it until exit.
pub fn init_file_logging(path: &Path) -> Result<WorkerGuard, LogError> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;
    fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer)
        .with_ansi(false)
        .finish()
        .try_init()?;
    Ok(guard)
}

/// Send logs to stderr, for one-shot CLI commands.
pub fn init_stderr_logging() -> Result<(), LogError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(io::stderr)
        .without_time()
        .finish()
        .try_init()?;
    Ok(())
}
