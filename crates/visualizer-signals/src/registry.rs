//! Detector handler registry.

use crate::{
    CrossoverDetectorHandler, DetectorHandler, GraphDetectorHandler, TickerDetectorHandler,
    TrivialDetectorHandler,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};
use visualizer_core::{DetectorRecord, EngineApi, EngineId, IdGenerator};

/// Detector types that need no configuration.
pub const TRIVIAL_DETECTORS: [&str; 2] = ["Monthly", "BiMonthly"];

/// Detector types configured with a single ticker.
pub const TICKER_DETECTORS: [&str; 2] = ["Golden Cross", "Death Cross"];

/// Mismatch between the engine's detector types and the registered handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Supported by the engine, no handler.
    pub unimplemented: Vec<String>,
    /// Handler registered, not supported by the engine.
    pub unsupported: Vec<String>,
}

impl Reconciliation {
    /// Names in `supported` without an implementation, and the reverse.
    pub fn between<'a>(
        supported: &[String],
        implemented: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let supported: BTreeSet<&str> = supported.iter().map(String::as_str).collect();
        let implemented: BTreeSet<&str> = implemented.into_iter().collect();
        Self {
            unimplemented: supported
                .difference(&implemented)
                .map(|s| s.to_string())
                .collect(),
            unsupported: implemented
                .difference(&supported)
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.unimplemented.is_empty() && self.unsupported.is_empty()
    }
}

/// Handlers keyed by detector static name.
pub struct HandlerRegistry {
    engine: Arc<dyn EngineApi>,
    handlers: BTreeMap<String, Arc<dyn DetectorHandler>>,
}

impl HandlerRegistry {
    /// Empty registry.
    pub fn new(engine: Arc<dyn EngineApi>) -> Self {
        Self {
            engine,
            handlers: BTreeMap::new(),
        }
    }

    /// Registry with a handler for every known detector type.
    pub fn with_defaults(engine: Arc<dyn EngineApi>, max_id: u64) -> Self {
        let mut registry = Self::new(engine.clone());
        for name in TRIVIAL_DETECTORS {
            registry.register(Arc::new(TrivialDetectorHandler::new(
                name,
                engine.clone(),
                IdGenerator::new(max_id),
            )));
        }
        for name in TICKER_DETECTORS {
            registry.register(Arc::new(TickerDetectorHandler::new(
                name,
                engine.clone(),
                IdGenerator::new(max_id),
            )));
        }
        registry.register(Arc::new(CrossoverDetectorHandler::new(
            engine.clone(),
            IdGenerator::new(max_id),
        )));
        registry.register(Arc::new(GraphDetectorHandler::new(
            engine,
            IdGenerator::new(max_id),
        )));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn DetectorHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DetectorHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Compare registered handlers with the detector types the engine supports.
    pub fn reconcile(&self, supported: &[String]) -> Reconciliation {
        let result = Reconciliation::between(supported, self.handlers.keys().map(String::as_str));
        for name in &result.unimplemented {
            warn!(detector = %name, "Signal detector supported by the engine has no handler");
        }
        for name in &result.unsupported {
            warn!(detector = %name, "Signal detector handler not supported by the engine");
        }
        result
    }

    /// Fetch the engine's supported detector types and reconcile against them.
    pub async fn reconcile_with_engine(&self) -> Option<Reconciliation> {
        match self.engine.supported_signal_detectors().await {
            Ok(supported) => Some(self.reconcile(&supported)),
            Err(e) => {
                warn!(error = %e, "Could not list supported signal detectors");
                None
            }
        }
    }

    /// Remove the detector listed as `record` from the engine.
    ///
    /// The record's id is resolved by the handler of its type. Refusals yield
    /// the given engine identity.
    pub async fn remove_detector(
        &self,
        engine: Option<&EngineId>,
        record: &DetectorRecord,
    ) -> Option<EngineId> {
        let engine = engine?;

        let Some(handler) = self.handlers.get(&record.static_name) else {
            warn!(detector = %record.static_name, "No handler for detector type");
            return Some(engine.clone());
        };
        let Some(id) = handler.detector_id(&record.config) else {
            warn!(detector = %record.name, "Detector has no id");
            return Some(engine.clone());
        };

        match self.engine.remove_signal_detector(engine, id).await {
            Ok(new_engine) => {
                info!(detector = id, from = %engine, to = %new_engine, "Detector removed");
                Some(new_engine)
            }
            Err(e) => {
                warn!(%engine, detector = id, error = %e, "Engine refused detector removal");
                Some(engine.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use visualizer_core::{CreateEngineRequest, DetectorSpec};
    use visualizer_engine::InMemoryEngine;

    fn registry(engine: &Arc<InMemoryEngine>) -> HandlerRegistry {
        HandlerRegistry::with_defaults(engine.clone(), 10_000_000)
    }

    #[test]
    fn test_default_handlers() {
        let engine = Arc::new(InMemoryEngine::new());
        let registry = registry(&engine);

        assert_eq!(
            registry.names(),
            vec!["BiMonthly", "Crossover", "Death Cross", "Golden Cross", "Graph", "Monthly"]
        );
        assert!(registry.get("Graph").is_some());
        assert_eq!(registry.get("Golden Cross").unwrap().id(), "GoldenCross");
        assert!(registry.get("Weekly").is_none());
    }

    #[test]
    fn test_reconcile() {
        let engine = Arc::new(InMemoryEngine::new());
        let registry = registry(&engine);
        let supported: Vec<String> = ["Graph", "Monthly", "Crossover", "Golden Cross", "Weekly"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let result = registry.reconcile(&supported);
        assert_eq!(result.unimplemented, vec!["Weekly"]);
        assert_eq!(result.unsupported, vec!["BiMonthly", "Death Cross"]);
        assert!(!result.is_consistent());
    }

    #[tokio::test]
    async fn test_reconcile_with_engine() {
        let engine = Arc::new(InMemoryEngine::new());
        let result = registry(&engine).reconcile_with_engine().await.unwrap();
        assert!(result.is_consistent());

        let engine =
            Arc::new(InMemoryEngine::new().with_supported_detectors(&["Graph", "Monthly"]));
        let result = registry(&engine).reconcile_with_engine().await.unwrap();
        assert_eq!(result.unsupported.len(), 4);
    }

    #[tokio::test]
    async fn test_remove_detector() {
        let engine = Arc::new(InMemoryEngine::new());
        let request = CreateEngineRequest::new(
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            &["AAPL".to_string()],
            vec![
                DetectorSpec::new("Monthly", "3"),
                DetectorSpec::graph(r#"{"id": 4, "name": "trend"}"#),
            ],
        );
        let id = engine.create_engine(&request).await.unwrap();
        let registry = registry(&engine);
        let records = engine.signal_detectors(&id).await.unwrap();

        let new_id = registry.remove_detector(Some(&id), &records[1]).await.unwrap();
        assert_eq!(engine.detector_ids(&new_id).await.unwrap(), vec![3]);

        // Already removed from the new engine.
        let again = registry.remove_detector(Some(&new_id), &records[1]).await;
        assert_eq!(again, Some(new_id));
        assert_eq!(registry.remove_detector(None, &records[0]).await, None);
    }

    #[tokio::test]
    async fn test_remove_ticker_and_crossover_detectors() {
        let engine = Arc::new(InMemoryEngine::new());
        let crossover = serde_json::json!({
            "id": 8,
            "name": "fast over slow",
            "ticker": "\"AAPL\"",
            "responsive_indicator_getter": { "name": "Identity", "config": null },
            "unresponsive_indicator_getter": {
                "name": "MovingAverage",
                "config": { "window": 20 },
            },
            "sentiment": "\"BULLISH\"",
        });
        let request = CreateEngineRequest::new(
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            &["AAPL".to_string()],
            vec![
                DetectorSpec::new("Golden Cross", r#"{"id": 6, "ticker": "\"AAPL\""}"#),
                DetectorSpec::new("Crossover", crossover.to_string()),
                DetectorSpec::new("Monthly", "3"),
            ],
        );
        let id = engine.create_engine(&request).await.unwrap();
        let registry = registry(&engine);
        let records = engine.signal_detectors(&id).await.unwrap();
        assert_eq!(records[1].name, "fast over slow");

        let id = registry.remove_detector(Some(&id), &records[0]).await.unwrap();
        assert_eq!(engine.detector_ids(&id).await.unwrap(), vec![8, 3]);
        let id = registry.remove_detector(Some(&id), &records[1]).await.unwrap();
        assert_eq!(engine.detector_ids(&id).await.unwrap(), vec![3]);
    }
}
