use super::*;
use pretty_assertions::assert_eq;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

fn render_time(timezone: TimezoneConfig) -> String {
    let mut buf = String::new();
    let timer = ConfigurableTimer::new(timezone);
    assert!(timer.format_time(&mut Writer::new(&mut buf)).is_ok());
    buf
}

#[test]
fn test_timer_marks_utc_only() {
    assert!(render_time(TimezoneConfig::Utc).ends_with('Z'));
    assert!(!render_time(TimezoneConfig::Local).ends_with('Z'));
}

#[test]
fn test_logging_config_default() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert_eq!(logging.timezone, TimezoneConfig::Local);
    assert!(!logging.location);
    assert!(logging.modules.is_empty());
}

#[test]
fn test_module_directives_raise_max_level() {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let logging = LoggingConfig {
        level: "warn".to_string(),
        modules: vec!["shellbook_queue=trace".to_string(), " ".to_string()],
        ..LoggingConfig::default()
    };
    let filter = build_env_filter(&logging, "error");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
}

#[test]
fn test_unparsable_level_falls_back_to_default() {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let logging = LoggingConfig {
        level: "shellbook=loudest".to_string(),
        ..LoggingConfig::default()
    };
    let filter = build_env_filter(&logging, "error");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
}
