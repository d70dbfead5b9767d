//! Environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::types::AppConfig;

pub const ENV_SHELL: &str = "SHELLBOOK_SHELL";
pub const ENV_COLUMNS: &str = "SHELLBOOK_COLUMNS";
pub const ENV_ROWS: &str = "SHELLBOOK_ROWS";
pub const ENV_STARTUP_TIMEOUT_MS: &str = "SHELLBOOK_STARTUP_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "SHELLBOOK_LOG_LEVEL";

/// The user's login shell, used when nothing else names a program.
pub const ENV_LOGIN_SHELL: &str = "SHELL";

/// Applies `SHELLBOOK_*` environment variables on top of a loaded config.
#[derive(Debug, Default)]
pub struct EnvLoader;

impl EnvLoader {
    /// Create a new environment loader.
    pub fn new() -> Self {
        Self
    }

    /// Override `config` in place.
    ///
    /// `SHELLBOOK_SHELL` replaces the configured program. `$SHELL` only
    /// fills it in when neither the file nor `SHELLBOOK_SHELL` set one.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(program) = self.get_path(ENV_SHELL) {
            debug!(env = ENV_SHELL, value = %program.display(), "loaded");
            config.shell.program = Some(program);
        } else if config.shell.program.is_none()
            && let Some(program) = self.get_path(ENV_LOGIN_SHELL)
        {
            debug!(env = ENV_LOGIN_SHELL, value = %program.display(), "loaded");
            config.shell.program = Some(program);
        }

        if let Some(val) = self.get_u16(ENV_COLUMNS) {
            config.terminal.columns = val;
            debug!(env = ENV_COLUMNS, value = val, "loaded");
        }

        if let Some(val) = self.get_u16(ENV_ROWS) {
            config.terminal.rows = val;
            debug!(env = ENV_ROWS, value = val, "loaded");
        }

        if let Some(val) = self.get_u64(ENV_STARTUP_TIMEOUT_MS) {
            config.shell.startup_timeout_ms = val;
            debug!(env = ENV_STARTUP_TIMEOUT_MS, value = val, "loaded");
        }

        if let Some(level) = self.get_string(ENV_LOG_LEVEL) {
            debug!(env = ENV_LOG_LEVEL, value = %level, "loaded");
            config.logging.level = Some(level);
        }
    }

    /// Get a non-empty string value from environment.
    fn get_string(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get a u16 value from environment.
    ///
    /// Logs a warning if the value is set but cannot be parsed.
    fn get_u16(&self, key: &str) -> Option<u16> {
        self.get_string(key).and_then(|s| match s.trim().parse::<u16>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(key, value = %s, "Failed to parse u16 from env var");
                None
            }
        })
    }

    /// Get a u64 value from environment.
    fn get_u64(&self, key: &str) -> Option<u64> {
        self.get_string(key).and_then(|s| match s.trim().parse::<u64>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(key, value = %s, "Failed to parse u64 from env var");
                None
            }
        })
    }

    fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_string(key).map(PathBuf::from)
    }
}

#[cfg(test)]
#[path = "env_loader.test.rs"]
mod tests;
