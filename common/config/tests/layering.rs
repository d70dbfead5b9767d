use pretty_assertions::assert_eq;
use serial_test::serial;
use shellbook_config::ConfigLoader;
use shellbook_config::env_loader::ENV_COLUMNS;
use shellbook_config::env_loader::ENV_ROWS;
use tempfile::TempDir;

#[test]
#[serial]
fn env_overrides_file_which_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"terminal": {"columns": 100, "rows": 30}}"#,
    )
    .unwrap();

    // SAFETY: test-only, serialized with #[serial]
    unsafe {
        std::env::set_var(ENV_COLUMNS, "140");
        std::env::remove_var(ENV_ROWS);
    }
    let config = shellbook_config::load_from(&ConfigLoader::from_path(dir.path()));
    // SAFETY: see above
    unsafe { std::env::remove_var(ENV_COLUMNS) };

    let config = config.unwrap();
    assert_eq!(config.terminal.columns, 140);
    assert_eq!(config.terminal.rows, 30);
}

#[test]
#[serial]
fn env_value_of_zero_is_rejected() {
    let dir = TempDir::new().unwrap();
    // SAFETY: test-only, serialized with #[serial]
    unsafe { std::env::set_var(ENV_COLUMNS, "0") };
    let result = shellbook_config::load_from(&ConfigLoader::from_path(dir.path()));
    // SAFETY: see above
    unsafe { std::env::remove_var(ENV_COLUMNS) };
    assert!(result.is_err());
}
