//! Logging helpers for building `tracing-subscriber` layers from config.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Timezone used for log timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneConfig {
    #[default]
    Local,
    Utc,
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Include file and line in each record.
    pub location: bool,
    /// Include the target module path in each record.
    pub target: bool,
    pub timezone: TimezoneConfig,
    /// Base filter directive, e.g. `"info"` or `"info,shellbook=debug"`.
    pub level: String,
    /// Extra per-module directives, e.g. `"shellbook_queue=trace"`.
    pub modules: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            location: false,
            target: false,
            timezone: TimezoneConfig::Local,
            level: "info".to_string(),
            modules: Vec::new(),
        }
    }
}

/// A timer that formats timestamps in local time or UTC.
///
/// A single type with runtime configuration, so both choices fit in one
/// layer type.
#[derive(Debug, Clone)]
pub struct ConfigurableTimer {
    timezone: TimezoneConfig,
}

impl ConfigurableTimer {
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self { timezone }
    }
}

impl FormatTime for ConfigurableTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self.timezone {
            TimezoneConfig::Local => {
                let now = chrono::Local::now();
                write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f"))
            }
            TimezoneConfig::Utc => {
                let now = chrono::Utc::now();
                write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3fZ"))
            }
        }
    }
}

/// Build an [`EnvFilter`] from the logging config.
///
/// `RUST_LOG` wins when set. Otherwise the configured level plus module
/// directives are used, falling back to `default_level` if they fail to
/// parse.
pub fn build_env_filter(logging: &LoggingConfig, default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = vec![logging.level.clone()];
    directives.extend(logging.modules.iter().cloned());
    let joined = directives
        .into_iter()
        .filter(|d| !d.trim().is_empty())
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::try_new(&joined).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Apply a [`LoggingConfig`] to a `fmt::layer()` builder.
///
/// Sets location, target and timer options, then attaches the env filter.
/// A macro because every builder step changes the layer's type.
#[macro_export]
macro_rules! configure_fmt_layer {
    ($layer:expr, $logging:expr, $default_level:expr) => {{
        use tracing_subscriber::Layer as _;
        let logging: &$crate::LoggingConfig = $logging;
        $layer
            .with_file(logging.location)
            .with_line_number(logging.location)
            .with_target(logging.target)
            .with_timer($crate::ConfigurableTimer::new(logging.timezone))
            .with_filter($crate::build_env_filter(logging, $default_level))
    }};
}

#[cfg(test)]
#[path = "logging.test.rs"]
mod tests;
