//! Error types for process drivers.

use shellbook_error::ErrorExt;
use shellbook_error::Location;
use shellbook_error::StatusCode;
use snafu::Snafu;

use crate::driver::CommandOutcome;

/// Errors reported by a [`ProcessDriver`](crate::ProcessDriver).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum DriverError {
    /// The shell process could not be started.
    #[snafu(display("Failed to spawn shell: {message}"))]
    Spawn {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// The shell did not print its first prompt in time.
    #[snafu(display("Shell did not become ready within {timeout_ms}ms"))]
    StartupTimeout {
        timeout_ms: u64,
        #[snafu(implicit)]
        location: Location,
    },

    /// The shell process is gone.
    #[snafu(display("Shell process exited"))]
    ShellExited {
        #[snafu(implicit)]
        location: Location,
    },

    /// The command ran and exited with a non-zero status.
    #[snafu(display("Command exited with status {}", outcome.exit_code))]
    CommandFailed {
        outcome: CommandOutcome,
        #[snafu(implicit)]
        location: Location,
    },

    /// A command was started while another one was still running.
    #[snafu(display("Shell is already running a command"))]
    Busy {
        #[snafu(implicit)]
        location: Location,
    },

    /// Talking to the pseudo-terminal failed.
    #[snafu(display("Terminal I/O failed: {message}"))]
    Terminal {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl DriverError {
    /// For drivers outside this crate: a command that exited non-zero.
    pub fn command_failed(outcome: CommandOutcome) -> Self {
        driver_error::CommandFailedSnafu { outcome }.build()
    }

    /// For drivers outside this crate: the process is gone.
    pub fn shell_exited() -> Self {
        driver_error::ShellExitedSnafu.build()
    }

    /// The settled command's outcome, when the command actually ran.
    pub fn outcome(&self) -> Option<&CommandOutcome> {
        match self {
            Self::CommandFailed { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}

impl ErrorExt for DriverError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Spawn { .. } => StatusCode::SpawnFailed,
            Self::StartupTimeout { .. } => StatusCode::Timeout,
            Self::ShellExited { .. } => StatusCode::ShellExited,
            Self::CommandFailed { .. } => StatusCode::CommandFailed,
            Self::Busy { .. } => StatusCode::DriverBusy,
            Self::Terminal { .. } => StatusCode::IoError,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
