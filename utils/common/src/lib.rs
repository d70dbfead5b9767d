//! Small helpers shared by shellbook crates.

pub mod elapsed;
pub mod logging;

pub use elapsed::format_duration;
pub use elapsed::format_millis;
pub use logging::ConfigurableTimer;
pub use logging::LoggingConfig;
pub use logging::TimezoneConfig;
pub use logging::build_env_filter;
