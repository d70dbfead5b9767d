//! Error types for configuration loading.

use shellbook_error::ErrorExt;
use shellbook_error::Location;
use shellbook_error::StatusCode;
use snafu::Snafu;

/// Configuration error type.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum ConfigError {
    /// Reading or creating a config path failed.
    #[snafu(display("{message}: {source}"))]
    Io {
        message: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// The config file is not valid JSON or does not match the schema.
    #[snafu(display("Invalid config in {file} at `{}`: {}", source.path(), source.inner()))]
    JsonParse {
        file: String,
        source: serde_path_to_error::Error<serde_json::Error>,
        #[snafu(implicit)]
        location: Location,
    },

    /// A value parsed but is out of range.
    #[snafu(display("Invalid value for {field}: {message}"))]
    InvalidValue {
        field: String,
        message: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ErrorExt for ConfigError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io { .. } => StatusCode::ConfigFileError,
            Self::JsonParse { .. } => StatusCode::InvalidJson,
            Self::InvalidValue { .. } => StatusCode::InvalidConfig,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
