//! Unified status codes for error classification.
//!
//! Status code format: XX_YYY (5-digit)
//! - XX = Category (00-99)
//! - YYY = Code within category (000-999)
//!
//! Category layout:
//! - General/Core (01-04): Common, Input, IO, Process
//! - Business (10-12): Config, Execution, Resource

use strum::AsRefStr;
use strum::EnumIter;
use strum::FromRepr;

/// Status code metadata.
#[derive(Debug, Clone, Copy)]
pub struct StatusMeta {
    pub retryable: bool,
    pub log_error: bool,
    pub category: StatusCategory,
}

/// Status code category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    // ====== General/Core (01-04) ======
    /// Common/internal errors (01_xxx)
    Common,
    /// Parameter/validation errors (02_xxx)
    Input,
    /// IO/storage errors (03_xxx)
    IO,
    /// Shell process errors (04_xxx)
    Process,

    // ====== Business (10-12) ======
    /// Configuration errors (10_xxx)
    Config,
    /// Cell execution errors (11_xxx)
    Execution,
    /// Resource limits (12_xxx)
    Resource,
}

macro_rules! define_status_codes {
    ($(
        $(#[$attr:meta])*
        $name:ident = $value:expr => {
            retryable: $retry:expr,
            log_error: $log:expr,
            category: $cat:ident $(,)?
        }
    ),* $(,)?) => {
        /// Status codes for error classification.
        ///
        /// Format: XX_YYY (5-digit)
        /// - XX = Category (00-99)
        /// - YYY = Code within category (000-999)
        ///
        /// Ranges:
        /// - 01_xxx: Common/Generic errors
        /// - 02_xxx: Input/Validation errors
        /// - 03_xxx: IO/Storage errors
        /// - 04_xxx: Shell process errors
        /// - 10_xxx: Config errors
        /// - 11_xxx: Cell execution errors
        /// - 12_xxx: Resource/Limit errors
        #[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, FromRepr)]
        #[repr(i32)]
        pub enum StatusCode {
            $($(#[$attr])* $name = $value,)*
        }

        impl StatusCode {
            /// Returns the metadata for this status code.
            pub const fn meta(&self) -> StatusMeta {
                match self {
                    $(Self::$name => StatusMeta {
                        retryable: $retry,
                        log_error: $log,
                        category: StatusCategory::$cat,
                    },)*
                }
            }

            /// Returns the string name of this status code.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }

        // Compile-time check for duplicate status code values
        const _: () = {
            const CODES: &[i32] = &[$($value),*];
            const fn check_unique() {
                let mut i = 0;
                while i < CODES.len() {
                    let mut j = i + 1;
                    while j < CODES.len() {
                        if CODES[i] == CODES[j] {
                            panic!("Duplicate status code value detected");
                        }
                        j += 1;
                    }
                    i += 1;
                }
            }
            check_unique();
        };
    };
}

define_status_codes! {
    // ====== Common errors (01_xxx) ======
    /// Unclassified error.
    Unknown = 01_000 => { retryable: false, log_error: true, category: Common },

    // ====== Input/Validation errors (02_xxx) ======
    /// Invalid JSON.
    InvalidJson = 02_002 => { retryable: false, log_error: false, category: Input },

    // ====== IO/Storage errors (03_xxx) ======
    /// Terminal or file IO failed.
    IoError = 03_000 => { retryable: false, log_error: false, category: IO },

    // ====== Shell process errors (04_xxx) ======
    /// The shell process could not be spawned.
    SpawnFailed = 04_000 => { retryable: false, log_error: true, category: Process },
    /// The shell process exited while a command was pending.
    ShellExited = 04_001 => { retryable: false, log_error: true, category: Process },
    /// The command finished with a non-zero exit code.
    CommandFailed = 04_002 => { retryable: false, log_error: false, category: Process },
    /// A command was submitted while another one was still running.
    DriverBusy = 04_003 => { retryable: true, log_error: true, category: Process },

    // ====== Config errors (10_xxx) ======
    /// Invalid configuration.
    InvalidConfig = 10_000 => { retryable: false, log_error: false, category: Config },
    /// Config file error.
    ConfigFileError = 10_001 => { retryable: false, log_error: false, category: Config },

    // ====== Cell execution errors (11_xxx) ======
    /// Pre-execution transform rejected the command.
    TransformFailed = 11_000 => { retryable: false, log_error: false, category: Execution },
    /// The execution queue is no longer accepting work.
    QueueClosed = 11_001 => { retryable: false, log_error: true, category: Execution },

    // ====== Resource/Limit errors (12_xxx) ======
    /// Shell startup timed out.
    Timeout = 12_000 => { retryable: true, log_error: false, category: Resource },
}

impl StatusCode {
    /// Returns true if the error is retryable.
    pub const fn is_retryable(&self) -> bool {
        self.meta().retryable
    }

    /// Returns true if the error should be logged.
    pub const fn should_log_error(&self) -> bool {
        self.meta().log_error
    }

    /// Returns the category of this status code.
    pub const fn category(&self) -> StatusCategory {
        self.meta().category
    }

    /// Convert from i32.
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::from_repr(value)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
#[path = "status_code.test.rs"]
mod tests;
