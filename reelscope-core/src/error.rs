// ============================================================================
// reelscope-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types and Helper Constructors
//
// This module defines the error type shared by every component of the core
// library. Most analysis failures never reach callers: the metric engines
// absorb them and substitute documented sentinel values. The errors that do
// propagate are configuration problems, missing external tools, and a video
// file that cannot be opened at all.
//
// KEY COMPONENTS:
// - CoreError: thiserror-based enum covering all failure categories
// - CoreResult: Result alias used throughout the crate
// - command_start_error / command_failed_error: helpers for external processes

use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the reelscope core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start command '{command}': {source}")]
    CommandStart {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("Video info error: {0}")]
    VideoInfoError(String),

    #[error("Cannot open video: {0}")]
    VideoOpen(String),

    #[error("Audio extraction error: {0}")]
    AudioExtraction(String),

    #[error("Face cascade error: {0}")]
    Cascade(String),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    JsonParseError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::JsonParseError(err.to_string())
    }
}

/// Result type for reelscope core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds the error for a command that could not be spawned.
pub fn command_start_error(command: impl Into<String>, source: std::io::Error) -> CoreError {
    CoreError::CommandStart {
        command: command.into(),
        source,
    }
}

/// Builds the error for a command that ran but did not succeed.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}
