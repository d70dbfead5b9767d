//! Configuration file loading.

use std::path::Path;
use std::path::PathBuf;

use snafu::ResultExt;
use tracing::debug;

use crate::error::ConfigError;
use crate::error::config_error::InvalidValueSnafu;
use crate::error::config_error::IoSnafu;
use crate::error::config_error::JsonParseSnafu;
use crate::types::AppConfig;

/// Default configuration directory name under the user's home.
pub const DEFAULT_CONFIG_DIR: &str = ".shellbook";

/// Application configuration file name (JSON).
pub const CONFIG_FILE: &str = "config.json";

/// Log directory name.
pub const LOG_DIR_NAME: &str = "log";

/// Environment variable for a custom shellbook home directory.
pub const SHELLBOOK_HOME_ENV: &str = "SHELLBOOK_HOME";

/// Environment variable for a custom log directory.
pub const SHELLBOOK_LOG_DIR_ENV: &str = "SHELLBOOK_LOG_DIR";

/// Get the default configuration directory path.
///
/// Returns `~/.shellbook` on Unix systems and `%USERPROFILE%\.shellbook` on Windows.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
}

/// Find the shellbook home directory.
///
/// Checks `SHELLBOOK_HOME` first, then falls back to `~/.shellbook`.
/// A relative `SHELLBOOK_HOME` is resolved against the current directory.
pub fn find_shellbook_home() -> PathBuf {
    match std::env::var(SHELLBOOK_HOME_ENV) {
        Ok(custom) => absolutize(custom),
        Err(_) => default_config_dir(),
    }
}

/// Get the log directory path.
///
/// Checks `SHELLBOOK_LOG_DIR` first, then falls back to `{home}/log`.
pub fn log_dir() -> PathBuf {
    match std::env::var(SHELLBOOK_LOG_DIR_ENV) {
        Ok(custom) => absolutize(custom),
        Err(_) => find_shellbook_home().join(LOG_DIR_NAME),
    }
}

fn absolutize(raw: String) -> PathBuf {
    let path = PathBuf::from(&raw);
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&raw))
        .unwrap_or(path)
}

/// Loads `config.json` from a config directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the resolved home directory.
    pub fn from_home() -> Self {
        Self {
            config_dir: find_shellbook_home(),
        }
    }

    /// Create a loader for a specific config directory.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Get the config directory path.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Check if the config directory exists.
    pub fn exists(&self) -> bool {
        self.config_dir.exists()
    }

    /// Ensure the config directory exists, creating it if necessary.
    pub fn ensure_dir(&self) -> Result<(), ConfigError> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir).context(IoSnafu {
                message: format!(
                    "Failed to create config directory {}",
                    self.config_dir.display(),
                ),
            })?;
            debug!(path = %self.config_dir.display(), "Created config directory");
        }
        Ok(())
    }

    /// Load and validate `config.json`.
    ///
    /// A missing or empty file yields [`AppConfig::default`]. Invalid JSON
    /// is an error rather than a silent fallback.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let path = self.config_file();
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&path).context(IoSnafu {
            message: format!("Failed to read {}", path.display()),
        })?;

        if content.trim().is_empty() {
            debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(AppConfig::default());
        }

        let config = parse_config(&content, &path)?;
        validate(&config)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

fn parse_config(content: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let deserializer = &mut serde_json::Deserializer::from_str(content);
    serde_path_to_error::deserialize(deserializer).context(JsonParseSnafu {
        file: path.display().to_string(),
    })
}

/// Reject values that parse but cannot drive a terminal.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.terminal.columns == 0 {
        return InvalidValueSnafu {
            field: "terminal.columns",
            message: "must be greater than zero",
        }
        .fail();
    }
    if config.terminal.rows == 0 {
        return InvalidValueSnafu {
            field: "terminal.rows",
            message: "must be greater than zero",
        }
        .fail();
    }
    if config.shell.startup_timeout_ms == 0 {
        return InvalidValueSnafu {
            field: "shell.startupTimeoutMs",
            message: "must be greater than zero",
        }
        .fail();
    }
    Ok(())
}

#[cfg(test)]
#[path = "loader.test.rs"]
mod tests;
