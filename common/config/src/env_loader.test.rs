use super::*;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;

// Helper to set and cleanup env vars in tests
struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn new() -> Self {
        Self { saved: Vec::new() }
    }

    fn set(&mut self, key: &str, value: &str) {
        self.saved.push((key.to_string(), env::var(key).ok()));
        // SAFETY: test-only, serialized with #[serial]
        unsafe { env::set_var(key, value) };
    }

    fn remove(&mut self, key: &str) {
        self.saved.push((key.to_string(), env::var(key).ok()));
        // SAFETY: test-only, serialized with #[serial]
        unsafe { env::remove_var(key) };
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.iter().rev() {
            // SAFETY: restoring the environment captured above
            unsafe {
                match previous {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

#[test]
#[serial]
fn test_overrides_terminal_and_timeout() {
    let mut guard = EnvGuard::new();
    guard.set(ENV_COLUMNS, "132");
    guard.set(ENV_ROWS, "50");
    guard.set(ENV_STARTUP_TIMEOUT_MS, "1500");
    guard.set(ENV_LOG_LEVEL, "debug");

    let mut config = AppConfig::default();
    EnvLoader::new().apply(&mut config);
    assert_eq!(config.terminal.columns, 132);
    assert_eq!(config.terminal.rows, 50);
    assert_eq!(config.shell.startup_timeout_ms, 1500);
    assert_eq!(config.logging.level.as_deref(), Some("debug"));
}

#[test]
#[serial]
fn test_invalid_number_is_ignored() {
    let mut guard = EnvGuard::new();
    guard.set(ENV_COLUMNS, "wide");

    let mut config = AppConfig::default();
    EnvLoader::new().apply(&mut config);
    assert_eq!(config.terminal.columns, crate::types::DEFAULT_COLUMNS);
}

#[test]
#[serial]
fn test_shellbook_shell_wins_over_file() {
    let mut guard = EnvGuard::new();
    guard.set(ENV_SHELL, "/bin/zsh");
    guard.set(ENV_LOGIN_SHELL, "/bin/fish");

    let mut config = AppConfig::default();
    config.shell.program = Some(PathBuf::from("/bin/bash"));
    EnvLoader::new().apply(&mut config);
    assert_eq!(config.shell.program, Some(PathBuf::from("/bin/zsh")));
}

#[test]
#[serial]
fn test_login_shell_only_fills_missing_program() {
    let mut guard = EnvGuard::new();
    guard.remove(ENV_SHELL);
    guard.set(ENV_LOGIN_SHELL, "/bin/fish");

    let mut from_file = AppConfig::default();
    from_file.shell.program = Some(PathBuf::from("/bin/bash"));
    EnvLoader::new().apply(&mut from_file);
    assert_eq!(from_file.shell.program, Some(PathBuf::from("/bin/bash")));

    let mut unset = AppConfig::default();
    EnvLoader::new().apply(&mut unset);
    assert_eq!(unset.shell.program, Some(PathBuf::from("/bin/fish")));
}
