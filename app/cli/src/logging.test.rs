use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_verbose_overrides_level_only() {
    let mut config = AppConfig::default();
    config.logging.level = Some("warn".to_string());
    config.logging.location = Some(true);

    let logging = effective_logging(&config, true);
    assert_eq!(logging.level, VERBOSE_LEVEL);
    assert!(logging.location);
}

#[test]
fn test_configured_level_without_verbose() {
    let mut config = AppConfig::default();
    config.logging.level = Some("warn".to_string());
    assert_eq!(effective_logging(&config, false).level, "warn");
}
