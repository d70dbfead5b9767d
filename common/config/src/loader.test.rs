use super::*;
use pretty_assertions::assert_eq;
use shellbook_error::ErrorExt;
use shellbook_error::StatusCode;
use tempfile::TempDir;

fn create_temp_config() -> (TempDir, ConfigLoader) {
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::from_path(temp_dir.path());
    (temp_dir, loader)
}

#[test]
fn test_default_config_dir() {
    let dir = default_config_dir();
    assert!(dir.to_string_lossy().contains(".shellbook"));
}

#[test]
fn test_loader_nonexistent_dir() {
    let loader = ConfigLoader::from_path("/nonexistent/path");
    assert!(!loader.exists());
    assert_eq!(loader.load_config().unwrap(), AppConfig::default());
}

#[test]
fn test_loader_ensure_dir() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nested").join("home");
    let loader = ConfigLoader::from_path(&config_path);

    assert!(!config_path.exists());
    loader.ensure_dir().unwrap();
    assert!(config_path.exists());
}

#[test]
fn test_load_empty_file() {
    let (temp_dir, loader) = create_temp_config();
    std::fs::write(temp_dir.path().join(CONFIG_FILE), "  \n").unwrap();
    assert_eq!(loader.load_config().unwrap(), AppConfig::default());
}

#[test]
fn test_load_config_file() {
    let (temp_dir, loader) = create_temp_config();
    let json = r#"{
        "shell": {"program": "/bin/bash", "cwd": "/tmp"},
        "terminal": {"columns": 100},
        "variables": {"name": "world"}
    }"#;
    std::fs::write(temp_dir.path().join(CONFIG_FILE), json).unwrap();

    let config = loader.load_config().unwrap();
    assert_eq!(config.shell.program, Some(PathBuf::from("/bin/bash")));
    assert_eq!(config.shell.cwd, Some(PathBuf::from("/tmp")));
    assert_eq!(config.terminal.columns, 100);
    assert_eq!(config.variables.get("name").map(String::as_str), Some("world"));
}

#[test]
fn test_invalid_json_reports_path() {
    let (temp_dir, loader) = create_temp_config();
    std::fs::write(
        temp_dir.path().join(CONFIG_FILE),
        r#"{"terminal": {"columns": "wide"}}"#,
    )
    .unwrap();

    let err = loader.load_config().unwrap_err();
    assert_eq!(err.status_code(), StatusCode::InvalidJson);
    assert!(err.to_string().contains("terminal.columns"), "{err}");
}

#[test]
fn test_malformed_json() {
    let (temp_dir, loader) = create_temp_config();
    std::fs::write(temp_dir.path().join(CONFIG_FILE), "{ not json").unwrap();
    let err = loader.load_config().unwrap_err();
    assert_eq!(err.status_code(), StatusCode::InvalidJson);
}

#[test]
fn test_zero_columns_rejected() {
    let (temp_dir, loader) = create_temp_config();
    std::fs::write(
        temp_dir.path().join(CONFIG_FILE),
        r#"{"terminal": {"columns": 0}}"#,
    )
    .unwrap();
    let err = loader.load_config().unwrap_err();
    assert_eq!(err.status_code(), StatusCode::InvalidConfig);
    assert!(err.to_string().contains("terminal.columns"));
}
