//! File-based logging bootstrap.
//!
//! The terminal belongs to the TUI, so diagnostics go to rotating files.
//! Messages are `event=<name> module=<area> key=value` lines.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

const LOG_FILE_BASENAME: &str = "ticklist";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

/// Error type for logging setup
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    BadLevel(String),
    #[error("could not create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already initialized at {0}")]
    AlreadyInitialized(PathBuf),
}

/// Start file logging. Calling again with the same directory is a no-op;
/// a different directory is rejected.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING_STATE.get() {
        if state.log_dir == log_dir {
            return Ok(());
        }
        return Err(LoggingError::AlreadyInitialized(state.log_dir.clone()));
    }

    std::fs::create_dir_all(log_dir).map_err(|e| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source: e,
    })?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    let state = LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    };
    if LOGGING_STATE.set(state).is_err() {
        // Lost a race with another initializer; its logger stays active
        return Ok(());
    }

    info!(
        "event=app_start module=logging level={} version={} log_dir={}",
        level,
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );
    Ok(())
}

/// Active `(level, dir)`, or None before `init_logging`
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::BadLevel(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(
            normalize_level("loud"),
            Err(LoggingError::BadLevel(_))
        ));
    }

    #[test]
    fn init_is_idempotent_and_rejects_other_dirs() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        init_logging("info", first.path()).unwrap();
        init_logging("info", first.path()).unwrap();
        let err = init_logging("info", second.path()).unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyInitialized(_)));

        let (level, dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(dir, first.path());
    }
}
