//! Subscriber setup: stderr always, a log file on request.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE: &str = "datacheck.log";

/// Overrides the platform log directory.
pub const LOG_DIR_ENV: &str = "DATACHECK_LOG_DIR";

/// Where the log file goes: `--log-dir`, then `DATACHECK_LOG_DIR`, then
/// `logs/` under the platform cache directory.
pub fn log_dir(explicit: Option<PathBuf>, from_env: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = explicit.or_else(|| from_env.map(PathBuf::from)) {
        return Ok(dir);
    }
    directories::ProjectDirs::from("", "", "datacheck")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .with_context(|| format!("No cache directory for log files; pass --log-dir or set {LOG_DIR_ENV}"))
}

/// Installs the global subscriber. Filtering follows `RUST_LOG`, `info` by
/// default. With `log_dir` set, logs are also appended to a file there and
/// the returned guard must live until exit for it to flush.
pub fn setup(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!(path = %dir.join(LOG_FILE).display(), "logging to file");
    }
    Ok(guard)
}
