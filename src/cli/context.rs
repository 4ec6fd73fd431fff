//! Shared command state.

use anyhow::{bail, Context as _, Result};
use std::sync::Arc;
use visualizer_config::AppConfig;
use visualizer_core::{DetectorRecord, EngineApi, EngineId};
use visualizer_engine::{HttpEngine, HttpEngineConfig};
use visualizer_signals::HandlerRegistry;

/// Loaded configuration and the engine backend.
pub struct Context {
    pub config: AppConfig,
    pub engine: Arc<dyn EngineApi>,
}

impl Context {
    /// Connect to the engine service named in the configuration.
    pub fn connect(config: AppConfig) -> Result<Self> {
        let settings = &config.engine;
        let engine_config = HttpEngineConfig::new(settings.api_url.clone(), settings.api_port)
            .with_timeout(settings.timeout())
            .with_max_connect_retries(settings.max_connect_retries);
        let engine = HttpEngine::new(engine_config).context("Failed to create engine client")?;

        Ok(Self::with_engine(config, Arc::new(engine)))
    }

    pub fn with_engine(config: AppConfig, engine: Arc<dyn EngineApi>) -> Self {
        Self { config, engine }
    }

    pub fn registry(&self) -> HandlerRegistry {
        HandlerRegistry::with_defaults(self.engine.clone(), self.config.ids.max_id_generator)
    }

    /// The single detector on `engine` called `name`.
    pub async fn detector_named(&self, engine: &EngineId, name: &str) -> Result<DetectorRecord> {
        let detectors = self
            .engine
            .signal_detectors(engine)
            .await
            .with_context(|| format!("Failed to list detectors of engine {}", engine))?;

        let mut matching = detectors.into_iter().filter(|d| d.name == name);
        match (matching.next(), matching.next()) {
            (Some(record), None) => Ok(record),
            (None, _) => bail!("No detector named {} on engine {}", name, engine),
            (Some(_), Some(_)) => {
                bail!("Several detectors are named {} on engine {}", name, engine)
            }
        }
    }
}
