//! Extension trait shared by every error type in the workspace.

use std::any::Any;
use std::error::Error;

use crate::status_code::StatusCode;

/// Classification hooks implemented by every crate-level error enum.
pub trait ErrorExt: Error {
    /// Returns the status code classifying this error.
    fn status_code(&self) -> StatusCode {
        StatusCode::Unknown
    }

    /// Returns the error as [`Any`] so callers can downcast.
    fn as_any(&self) -> &dyn Any;

    /// Whether retrying the failed operation may succeed.
    fn is_retryable(&self) -> bool {
        self.status_code().is_retryable()
    }

    /// Message safe to show to an end user.
    ///
    /// Unclassified failures are reduced to their numeric code so that
    /// implementation details stay in the logs.
    fn output_msg(&self) -> String {
        match self.status_code() {
            StatusCode::Unknown => {
                format!("Internal error: {}", self.status_code() as i32)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "ext.test.rs"]
mod tests;
