//! Configuration structures.

use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub ids: IdSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.api_url.trim().is_empty() {
            return Err(ConfigError::Message("engine.api_url must not be empty".into()));
        }
        if self.ids.max_id_generator == 0 {
            return Err(ConfigError::Message(
                "ids.max_id_generator must be positive".into(),
            ));
        }
        if self.session.max_sessions == 0 {
            return Err(ConfigError::Message(
                "session.max_sessions must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Heading printed above command output.
    pub title: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            title: "Stock Market Engine".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Remote engine connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub api_url: String,
    pub api_port: u16,
    pub timeout_secs: u64,
    pub max_connect_retries: u32,
}

impl EngineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            api_url: "http://stock-market-engine".to_string(),
            api_port: 8001,
            timeout_secs: 2,
            max_connect_retries: 5,
        }
    }
}

/// Random id generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdSettings {
    /// Ids are drawn from `[0, max_id_generator)`.
    pub max_id_generator: u64,
}

impl Default for IdSettings {
    fn default() -> Self {
        Self {
            max_id_generator: 10_000_000,
        }
    }
}

/// Session payload storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
        }
    }
}
