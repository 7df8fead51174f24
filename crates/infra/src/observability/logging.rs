//! Tracing subscriber setup
//!
//! Logs go to the configured file through a non-blocking writer, or to
//! stdout when no file is configured. `RUST_LOG` overrides the configured
//! level.

use std::fs::File;

use meetbell_domain::{expand_path, LoggingConfig, MeetbellError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive.
///
/// Dropping it flushes pending records; hold it until the process exits.
#[must_use = "dropping the guard stops the log writer"]
#[derive(Debug)]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Build the level filter: `RUST_LOG` when set, else `level`.
///
/// # Errors
/// Returns `MeetbellError::Config` when `level` is not a valid directive.
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| MeetbellError::Config(format!("invalid log level {level:?}: {e}")))
}

/// Install the global subscriber.
///
/// An existing log file is truncated.
///
/// # Errors
/// Fails when the level is invalid, the log file cannot be created, or a
/// global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let filter = build_filter(&config.level)?;

    match &config.file {
        Some(path) => {
            let path = expand_path(&path.to_string_lossy())?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MeetbellError::Config(format!("cannot create log directory {}: {e}", parent.display()))
                })?;
            }
            let file = File::create(&path).map_err(|e| {
                MeetbellError::Config(format!("cannot create log file {}: {e}", path.display()))
            })?;
            let (writer, worker) = tracing_appender::non_blocking(file);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
                .map_err(|e| MeetbellError::Internal(format!("cannot install logger: {e}")))?;

            tracing::info!(path = %path.display(), "logging_initialized");
            Ok(LogGuard { _worker: Some(worker) })
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stdout)
                .try_init()
                .map_err(|e| MeetbellError::Internal(format!("cannot install logger: {e}")))?;
            Ok(LogGuard { _worker: None })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_levels_and_directives() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("info,meetbell_core=trace").is_ok());
    }

    #[test]
    fn rejects_garbage_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(build_filter("meetbell=[[["), Err(MeetbellError::Config(_))));
    }
}
