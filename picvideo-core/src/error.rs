// ============================================================================
// picvideo-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the slideshow pipeline
//
// Every fallible operation in picvideo-core returns `CoreResult<T>`. Most of
// these errors are absorbed inside the pipeline (a failed probe or a skipped
// image is logged, not raised); only the whole-run failures of the sequence
// assembler reach the caller.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Errors produced by picvideo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required external tool '{0}' was not found")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Failed while waiting for '{0}': {1}")]
    CommandWait(String, #[source] std::io::Error),

    #[error("'{0}' exited with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("'{0}' timed out after {}s", .1.as_secs())]
    CommandTimeout(String, Duration),

    #[error("Could not parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Invalid image dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No image files found")]
    NoFilesFound,

    #[error("No images could be composed into frames")]
    NoFramesComposed,

    #[error("Run was cancelled")]
    Cancelled,

    #[error("{0}")]
    OperationFailed(String),
}

/// Result alias used throughout picvideo-core.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

pub fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

pub fn command_timeout_error(cmd: impl Into<String>, timeout: Duration) -> CoreError {
    CoreError::CommandTimeout(cmd.into(), timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_reports_seconds() {
        let err = command_timeout_error("ffmpeg (frame)", Duration::from_secs(30));
        assert_eq!(err.to_string(), "'ffmpeg (frame)' timed out after 30s");
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoreError = io_err.into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
