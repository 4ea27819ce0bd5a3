//! Logging setup for the hexapod executables
//!
//! Every line carries the elapsed session time and the last hardware frame
//! seen by the main loop, so log output can be matched against the motion
//! archives which are indexed by frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Last frame published with `set_frame`, `NO_FRAME` before the first.
static CURRENT_FRAME: AtomicU64 = AtomicU64::new(NO_FRAME);

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NO_FRAME: u64 = u64::MAX;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Logging parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogParams {
    /// Minimum level of all targets without an override. Must be at least
    /// `Info`.
    pub level: LevelFilter,

    /// Level overrides per target, for example `hex_lib::motion_core` to
    /// quieten the per frame output.
    #[serde(default)]
    pub target_levels: HashMap<String, LevelFilter>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must include `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution, writing to stdout and the
/// session's log file.
///
/// Fails if the logger was already set.
pub fn logger_init(params: &LogParams, session: &session::Session) -> Result<(), LoggerInitError> {
    if params.level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(params.level));
    }

    let log_file =
        fern::log_file(session.log_file_path.clone()).map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            // Below info include the target
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:10.6} {:>7} {}] {}: {}",
                    session::get_elapsed_seconds(),
                    frame_tag(),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{:10.6} {:>7} {}] {}",
                    session::get_elapsed_seconds(),
                    frame_tag(),
                    level_to_str(record.level()),
                    message
                ))
            }
        })
        .level(params.level);

    for (target, level) in params.target_levels.iter() {
        dispatch = dispatch.level_for(target.clone(), *level);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", params.level);
    for (target, level) in params.target_levels.iter() {
        info!("    {} level: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Publish the frame the main loop is processing, shown on every log line.
pub fn set_frame(frame: u64) {
    CURRENT_FRAME.store(frame, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Frame column of a log line, `-` until a frame has been published.
fn frame_tag() -> String {
    match CURRENT_FRAME.load(Ordering::Relaxed) {
        NO_FRAME => String::from("-"),
        f => format!("#{}", f),
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_tag() {
        set_frame(42);
        assert_eq!(frame_tag(), "#42");
        set_frame(NO_FRAME);
        assert_eq!(frame_tag(), "-");
    }

    #[test]
    fn test_log_params() {
        let params: LogParams = toml::from_str(
            "level = \"debug\"\n\
             [target_levels]\n\
             \"hex_lib::motion_core\" = \"info\"\n",
        )
        .unwrap();

        assert_eq!(params.level, LevelFilter::Debug);
        assert_eq!(
            params.target_levels.get("hex_lib::motion_core"),
            Some(&LevelFilter::Info)
        );

        let params: LogParams = toml::from_str("level = \"trace\"").unwrap();
        assert!(params.target_levels.is_empty());
    }

    #[test]
    fn test_rejects_quiet_level() {
        let dir = tempfile::tempdir().unwrap();
        let session = session::Session::new_in(dir.path().to_path_buf(), "logger_test").unwrap();

        let params = LogParams {
            level: LevelFilter::Warn,
            target_levels: HashMap::new(),
        };
        match logger_init(&params, &session) {
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn)) => (),
            r => panic!("Expected an invalid level error, got {:?}", r),
        }
    }
}
