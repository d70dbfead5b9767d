use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.terminal.columns, DEFAULT_COLUMNS);
    assert_eq!(config.terminal.rows, DEFAULT_ROWS);
    assert_eq!(config.shell.startup_timeout_ms, DEFAULT_STARTUP_TIMEOUT_MS);
    assert!(config.shell.program.is_none());
    assert!(config.variables.is_empty());
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config: AppConfig =
        serde_json::from_str(r#"{"terminal": {"columns": 132}, "shell": {"args": ["-i"]}}"#)
            .unwrap();
    assert_eq!(config.terminal.columns, 132);
    assert_eq!(config.terminal.rows, DEFAULT_ROWS);
    assert_eq!(config.shell.args, vec!["-i".to_string()]);
    assert_eq!(config.shell.startup_timeout_ms, DEFAULT_STARTUP_TIMEOUT_MS);
}

#[test]
fn test_camel_case_fields() {
    let config: AppConfig = serde_json::from_str(
        r#"{"shell": {"program": "/bin/zsh", "startupTimeoutMs": 250, "env": {"A": "1"}}}"#,
    )
    .unwrap();
    assert_eq!(config.shell.program, Some(PathBuf::from("/bin/zsh")));
    assert_eq!(config.shell.startup_timeout_ms, 250);
    assert_eq!(config.shell.env.get("A").map(String::as_str), Some("1"));
}

#[test]
fn test_program_or_default() {
    let mut shell = ShellConfig::default();
    assert_eq!(shell.program_or_default(), PathBuf::from(FALLBACK_SHELL));
    shell.program = Some(PathBuf::from("/usr/bin/bash"));
    assert_eq!(shell.program_or_default(), PathBuf::from("/usr/bin/bash"));
}

#[test]
fn test_to_common_logging() {
    let logging = LoggingConfig {
        level: Some("debug".to_string()),
        location: Some(true),
        target: None,
        timezone: Some("utc".to_string()),
        modules: Some(vec!["shellbook_shell=trace".to_string()]),
    };
    let common = logging.to_common_logging();
    assert_eq!(common.level, "debug");
    assert!(common.location);
    assert!(!common.target);
    assert_eq!(common.timezone, shellbook_utils_common::TimezoneConfig::Utc);
    assert_eq!(common.modules, vec!["shellbook_shell=trace".to_string()]);

    let defaults = LoggingConfig::default().to_common_logging();
    assert_eq!(defaults.level, "info");
    assert_eq!(defaults.timezone, shellbook_utils_common::TimezoneConfig::Local);
}
