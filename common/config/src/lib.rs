//! Configuration for shellbook.
//!
//! Values are resolved in layers: built-in defaults, then
//! `~/.shellbook/config.json`, then `SHELLBOOK_*` environment variables.
//! Command-line flags are applied last by the binary.

pub mod env_loader;
pub mod error;
pub mod loader;
pub mod types;

pub use env_loader::EnvLoader;
pub use error::ConfigError;
pub use error::Result;
pub use loader::ConfigLoader;
pub use loader::find_shellbook_home;
pub use loader::log_dir;
pub use types::AppConfig;
pub use types::LoggingConfig;
pub use types::ShellConfig;
pub use types::TerminalConfig;

/// Load the config file from the home directory and apply env overrides.
pub fn load() -> Result<AppConfig> {
    load_from(&ConfigLoader::from_home())
}

/// Like [`load`], with an explicit loader.
pub fn load_from(loader: &ConfigLoader) -> Result<AppConfig> {
    let mut config = loader.load_config()?;
    EnvLoader::new().apply(&mut config);
    loader::validate(&config)?;
    Ok(config)
}
