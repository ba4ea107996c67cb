// ============================================================================
// picvideo-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reports failures as picvideo-core errors so that core and CLI
// messages share one shape. Context is attached with `CliErrorContext`.

use picvideo_core::{CoreError, CoreResult};

use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {}", f(), core_error))
        })
    }
}

/// Rejects user input the pipeline must never see.
pub fn invalid_input(message: impl Into<String>) -> CoreError {
    CoreError::Config(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_context_prefixes_message() {
        let result: Result<(), io::Error> = Err(io::Error::other("disk full"));
        let err = result
            .cli_with_context(|| "Failed to create log directory")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create log directory: I/O error: disk full"
        );
    }

    #[test]
    fn test_lazy_context_not_evaluated_on_success() {
        let result: Result<u8, CoreError> = Ok(3);
        let value = result
            .cli_with_context(|| -> String { panic!("context must not be built") })
            .unwrap();
        assert_eq!(value, 3);
    }
}
