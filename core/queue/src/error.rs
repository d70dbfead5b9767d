//! Error types for the execution queue.

use shellbook_error::ErrorExt;
use shellbook_error::Location;
use shellbook_error::StatusCode;
use snafu::Snafu;

/// A pre-execution transform rejected the command.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum TransformError {
    /// The template could not be parsed or rendered.
    #[snafu(display("{message}"))]
    Render {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// A custom transform refused the command.
    #[snafu(display("{message}"))]
    Rejected {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl TransformError {
    /// Build a rejection from outside this crate.
    pub fn rejected(message: impl Into<String>) -> Self {
        transform_error::RejectedSnafu {
            message: message.into(),
        }
        .build()
    }
}

impl ErrorExt for TransformError {
    fn status_code(&self) -> StatusCode {
        StatusCode::TransformFailed
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Errors reported by the queue itself.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum QueueError {
    /// The queue has been shut down.
    #[snafu(display("Execution queue is closed"))]
    Closed {
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for QueueError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Closed { .. } => StatusCode::QueueClosed,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
