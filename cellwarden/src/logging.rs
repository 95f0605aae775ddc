//! Logging setup for cellwarden front ends.
//!
//! - Writes to a log file that is cleared on each start
//! - Optionally mirrors to stdout
//! - Filter is `info` unless `RUST_LOG` says otherwise

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    path: PathBuf,
    _file_guard: WorkerGuard,
}

impl LoggingGuard {
    /// Path of the log file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Installs the global subscriber.
///
/// Creates `log_dir` if needed and truncates `log_dir/log_file`. When
/// `stdout` is set, events are also printed to the terminal.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be cleared.
pub fn init_logging(log_dir: &Path, log_file: &str, stdout: bool) -> io::Result<LoggingGuard> {
    let path = prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stdout_layer = stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init();

    Ok(LoggingGuard {
        path,
        _file_guard: file_guard,
    })
}

/// Creates the directory and an empty log file, returning its path.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file);
    fs::write(&path, "")?;
    Ok(path)
}
