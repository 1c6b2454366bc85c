// ============================================================================
// reelscope-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING
//
// The CLI reports failures through reelscope-core's `CoreError`. Filesystem
// steps the CLI performs itself (config files, saved previews) name the path
// involved through `cli_with_context`.

use reelscope_core::{CoreError, CoreResult};
use std::fmt;

/// Result type of every command.
pub type CliResult<T> = CoreResult<T>;

/// Prefixes an error with a lazily built description of the failed step.
pub trait CliErrorContext<T> {
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
        self.map_err(|e| CoreError::OperationFailed(format!("{}: {}", f(), e.into())))
    }
}
