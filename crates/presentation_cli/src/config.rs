//! Configuration loading
//!
//! Layers, lowest precedence first: built-in defaults, a TOML file, then
//! `ENTUR_*` environment variables (e.g. `ENTUR_TIMEOUT_SECS=30`).

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use integration_entur::EnturConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ENTUR";

/// File looked up in the working directory when no path is given
const DEFAULT_CONFIG_FILE: &str = "entur";

/// Load and validate the Entur configuration
///
/// # Errors
///
/// Returns an error if an explicit file is missing or unreadable, a value has
/// the wrong type, or the resulting configuration fails validation.
pub fn load_config(path: Option<&Path>) -> Result<EnturConfig, ConfigError> {
    load_with_env(path, env_source())
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with_env(path: Option<&Path>, env: Environment) -> Result<EnturConfig, ConfigError> {
    let builder = Config::builder();

    let builder = match path {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
    };

    let config: EnturConfig = builder.add_source(env).build()?.try_deserialize()?;
    config.validate().map_err(ConfigError::Message)?;
    Ok(config)
}
