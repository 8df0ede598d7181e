//! Tracing subscriber setup.
//!
//! Text commands log to stderr. The dashboard owns the terminal, so it logs to
//! a daily-rolling file instead; keep the returned guard alive until exit so
//! buffered lines are flushed.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

const LOG_FILE_NAME: &str = "traffic.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_stderr() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| AppError::config(format!("Failed to initialize logging: {e}")))
}

/// Log to `<log_dir>/traffic.log.<date>`, filtered by `RUST_LOG` (default `info`).
///
/// An unusable log directory is a `Config` error.
pub fn init_file(log_dir: &Path) -> Result<WorkerGuard, AppError> {
    let appender = file_appender(log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .map_err(|e| AppError::config(format!("Failed to initialize logging: {e}")))?;

    Ok(guard)
}

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, AppError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_dir)
        .map_err(|e| {
            AppError::config(format!(
                "Cannot write logs to '{}': {e}. Set --log-dir or TRAFFIC_LOG_DIR to a writable directory.",
                log_dir.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn unwritable_log_dir_is_a_config_error() {
        let Err(err) = init_file(Path::new("/proc/nonexistent/traffic-logs")) else {
            panic!("expected an error for an unwritable log dir");
        };
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("/proc/nonexistent/traffic-logs"));
    }

    #[test]
    fn log_dir_is_created_on_demand() {
        let dir = std::env::temp_dir().join(format!("traffic-dash-logs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        assert!(file_appender(&dir).is_ok());
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
