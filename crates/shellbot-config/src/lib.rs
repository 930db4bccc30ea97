//! shellbot configuration.
//!
//! TOML-based tunables for the output relay, the spawned shell, the chat
//! connection and logging. Every section uses serde defaults so an absent
//! or partial file works.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{BotConfig, ConnectionConfig, LogLevel, LoggingConfig, RelayConfig, ShellConfig};

use shellbot_common::ConfigError;
use std::path::Path;

/// Load config from `path` if given, otherwise from the platform default
/// location, then validate it.
pub fn load_config(path: Option<&Path>) -> Result<BotConfig, ConfigError> {
    let config = match path {
        Some(p) => toml_loader::load_from_path(p)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}
