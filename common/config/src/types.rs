//! Configuration file types.
//!
//! Every section and field is optional in `config.json`; missing values take
//! the defaults defined here.
//!
//! ```json
//! {
//!   "shell": { "program": "/bin/bash", "args": ["--noprofile"], "startupTimeoutMs": 5000 },
//!   "terminal": { "columns": 120, "rows": 40 },
//!   "logging": { "level": "debug", "timezone": "utc" },
//!   "variables": { "project": "demo" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Default terminal width.
pub const DEFAULT_COLUMNS: u16 = 80;

/// Default terminal height.
pub const DEFAULT_ROWS: u16 = 24;

/// Default time to wait for the shell's first prompt.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 5_000;

/// Shell used when neither config nor environment names one.
pub const FALLBACK_SHELL: &str = "/bin/sh";

/// Root of `config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub shell: ShellConfig,
    pub terminal: TerminalConfig,
    pub logging: LoggingConfig,
    /// Variables available to command templates.
    pub variables: BTreeMap<String, String>,
}

/// The persistent shell process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ShellConfig {
    /// Shell executable. `None` means `$SHELL`, then [`FALLBACK_SHELL`].
    pub program: Option<PathBuf>,
    /// Extra arguments passed to the shell.
    pub args: Vec<String>,
    /// Initial working directory. Defaults to the current directory.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for the shell.
    pub env: BTreeMap<String, String>,
    pub startup_timeout_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            startup_timeout_ms: DEFAULT_STARTUP_TIMEOUT_MS,
        }
    }
}

impl ShellConfig {
    /// The configured program, or [`FALLBACK_SHELL`].
    pub fn program_or_default(&self) -> PathBuf {
        self.program
            .clone()
            .unwrap_or_else(|| PathBuf::from(FALLBACK_SHELL))
    }
}

/// Pseudo-terminal size.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TerminalConfig {
    pub columns: u16,
    pub rows: u16,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

/// Logging section of `config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error").
    #[serde(default)]
    pub level: Option<String>,

    /// Include source location in logs.
    #[serde(default)]
    pub location: Option<bool>,

    /// Include target module path in logs.
    #[serde(default)]
    pub target: Option<bool>,

    /// Timezone for log timestamps ("local" or "utc", default: "local").
    #[serde(default)]
    pub timezone: Option<String>,

    /// Per-module log levels (e.g., ["shellbook_queue=debug"]).
    #[serde(default)]
    pub modules: Option<Vec<String>>,
}

impl LoggingConfig {
    /// Convert to the resolved `shellbook_utils_common::LoggingConfig`.
    pub fn to_common_logging(&self) -> shellbook_utils_common::LoggingConfig {
        shellbook_utils_common::LoggingConfig {
            level: self.level.clone().unwrap_or_else(|| "info".to_string()),
            location: self.location.unwrap_or(false),
            target: self.target.unwrap_or(false),
            timezone: match self.timezone.as_deref() {
                Some("utc") => shellbook_utils_common::TimezoneConfig::Utc,
                _ => shellbook_utils_common::TimezoneConfig::Local,
            },
            modules: self.modules.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[path = "types.test.rs"]
mod tests;
