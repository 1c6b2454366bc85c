// ============================================================================
// reelscope-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console or File Logging
//
// Console runs use env_logger on stderr, so `--json` output on stdout stays
// clean. With `--log-dir`, all records go to a timestamped log4rs file
// instead (see reelscope_core::file_logging).
//
// USAGE:
// - default: info and above
// - --verbose: debug and above
// - RUST_LOG overrides the console filter

use crate::error::CliResult;
use log::LevelFilter;
use reelscope_core::CoreError;
use reelscope_core::file_logging::setup_file_logging;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Log level selected by the `--verbose` flag.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Path of the log file for a run started now.
pub fn log_file_path(log_dir: &Path, command: &str) -> PathBuf {
    log_dir.join(format!("reelscope_{}_{}.log", command, get_timestamp()))
}

/// Installs the process logger. Returns the log file path when logging to a
/// file.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>, command: &str) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);

    match log_dir {
        Some(dir) => {
            let path = log_file_path(dir, command);
            setup_file_logging(&path, level).map_err(|e| {
                CoreError::OperationFailed(format!(
                    "Setting up log file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Ok(Some(path))
        }
        None => {
            let env = env_logger::Env::default().default_filter_or(level.as_str());
            // A logger may already be installed when embedded; keep that one.
            let _ = env_logger::Builder::from_env(env)
                .format_timestamp(None)
                .format_target(false)
                .try_init();
            Ok(None)
        }
    }
}
