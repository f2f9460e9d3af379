//! Cardboard configuration.
//!
//! TOML-based with serde defaults, so partial configs work out of the box.
//! A missing config file is created with documented defaults; an invalid
//! one falls back to defaults with a warning.

pub mod schema;
pub mod toml_loader;
pub mod validation;
pub mod watcher;

pub use schema::{CardboardConfig, CONFIG_SCHEMA_VERSION};
pub use watcher::ConfigWatcher;

use cardboard_common::ConfigError;

/// Load config from the platform default path, validating the result.
pub fn load_config() -> Result<CardboardConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}
