//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, EngineSettings, IdSettings, LoggingConfig, SessionSettings,
};

pub use config::ConfigError;

use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Environment variable prefix, e.g. `VISUALIZER__ENGINE__API_PORT`.
pub const ENV_PREFIX: &str = "VISUALIZER";

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from an optional file and the environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(environment())
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

/// Parse configuration from TOML text, without environment overrides.
pub fn parse_config(toml: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}
