//! Handler for crossover detectors.

use crate::handler::{submit, DetectorHandler};
use crate::registry::Reconciliation;
use crate::ticker::{encoded, preselect_ticker};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tracing::warn;
use visualizer_core::{
    EngineApi, EngineId, IdGenerator, IndicatorGetter, Sentiment, SignalDataPayload,
};

/// Static name of the crossover detector.
pub const CROSSOVER_DETECTOR_NAME: &str = "Crossover";

/// Indicator types a crossover side can be built from.
pub const INDICATORS: [&str; 3] = ["Identity", "MovingAverage", "ExponentialMovingAverage"];

/// The indicator that passes prices through unchanged. Only valid on the
/// responsive side.
pub const IDENTITY_INDICATOR: &str = "Identity";

fn getter_value(getter: &IndicatorGetter) -> Value {
    json!({ "name": getter.name, "config": getter.config })
}

/// Signals when a responsive indicator crosses an unresponsive one on the
/// selected ticker.
pub struct CrossoverDetectorHandler {
    engine: Arc<dyn EngineApi>,
    ids: Mutex<IdGenerator>,
}

impl CrossoverDetectorHandler {
    pub fn new(engine: Arc<dyn EngineApi>, ids: IdGenerator) -> Self {
        Self {
            engine,
            ids: Mutex::new(ids),
        }
    }

    /// Compare the known indicator types with those the engine supports.
    pub async fn reconcile_indicators(&self) -> Option<Reconciliation> {
        let supported = match self.engine.supported_indicators().await {
            Ok(supported) => supported,
            Err(e) => {
                warn!(error = %e, "Could not list supported indicators");
                return None;
            }
        };
        let result = Reconciliation::between(&supported, INDICATORS);
        for name in &result.unimplemented {
            warn!(indicator = %name, "Indicator supported by the engine is not implemented");
        }
        for name in &result.unsupported {
            warn!(indicator = %name, "Indicator not supported by the engine");
        }
        Some(result)
    }

    /// Detector configuration, or the reason the payload is incomplete.
    fn config(payload: &SignalDataPayload) -> Result<ConfigParts<'_>, &'static str> {
        let name = payload.detector_name().ok_or("No name set")?;
        let responsive = payload.responsive.as_ref().ok_or("No responsive indicator")?;
        let unresponsive = payload
            .unresponsive
            .as_ref()
            .ok_or("No unresponsive indicator")?;
        if unresponsive.name == IDENTITY_INDICATOR {
            return Err("Unresponsive indicator cannot be Identity");
        }
        let ticker = payload.ticker().ok_or("No ticker selected")?;
        let sentiment = match payload.sentiment {
            Some(Sentiment::Neutral) | None => return Err("No sentiment selected"),
            Some(sentiment) => sentiment,
        };
        Ok(ConfigParts {
            name,
            ticker,
            responsive,
            unresponsive,
            sentiment,
        })
    }
}

struct ConfigParts<'a> {
    name: &'a str,
    ticker: &'a str,
    responsive: &'a IndicatorGetter,
    unresponsive: &'a IndicatorGetter,
    sentiment: Sentiment,
}

impl ConfigParts<'_> {
    fn to_json(&self, id: u64) -> String {
        json!({
            "id": id,
            "name": self.name,
            "ticker": encoded(self.ticker),
            "responsive_indicator_getter": getter_value(self.responsive),
            "unresponsive_indicator_getter": getter_value(self.unresponsive),
            "sentiment": encoded(&self.sentiment.to_string()),
        })
        .to_string()
    }
}

#[async_trait]
impl DetectorHandler for CrossoverDetectorHandler {
    fn name(&self) -> &str {
        CROSSOVER_DETECTOR_NAME
    }

    async fn activate(
        &self,
        engine: Option<&EngineId>,
        payload: &mut SignalDataPayload,
    ) -> Option<EngineId> {
        preselect_ticker(self.engine.as_ref(), engine, payload).await;
        engine.cloned()
    }

    async fn create(
        &self,
        engine: Option<&EngineId>,
        payload: &mut SignalDataPayload,
    ) -> Option<EngineId> {
        let engine = engine?;
        let parts = match Self::config(payload) {
            Ok(parts) => parts,
            Err(reason) => {
                warn!(%engine, reason, "Crossover detector refused");
                return Some(engine.clone());
            }
        };
        let new_engine = submit(
            self.engine.as_ref(),
            &self.ids,
            engine,
            CROSSOVER_DETECTOR_NAME,
            |id| parts.to_json(id),
        )
        .await;

        if new_engine.as_ref() != Some(engine) {
            payload.reset();
        }
        new_engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use visualizer_core::{CreateEngineRequest, DetectorSpec, IndicatorSlot};
    use visualizer_engine::InMemoryEngine;

    async fn engine_with_aapl(engine: &InMemoryEngine) -> EngineId {
        let request = CreateEngineRequest::new(
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            &["AAPL".to_string()],
            vec![DetectorSpec::new("Monthly", "3")],
        );
        engine.create_engine(&request).await.unwrap()
    }

    fn getter(name: &str, config: Value) -> IndicatorGetter {
        IndicatorGetter {
            name: name.to_string(),
            config,
        }
    }

    fn complete_payload() -> SignalDataPayload {
        let name = Some("fast over slow".to_string());
        let mut payload = SignalDataPayload::with_graph(Vec::new(), name);
        payload.ticker = Some("AAPL".to_string());
        payload.sentiment = Some(Sentiment::Bullish);
        payload.set_indicator(IndicatorSlot::Responsive, Some(getter("Identity", Value::Null)));
        payload.set_indicator(
            IndicatorSlot::Unresponsive,
            Some(getter("MovingAverage", json!({ "window": 20 }))),
        );
        payload
    }

    fn handler(engine: &Arc<InMemoryEngine>) -> CrossoverDetectorHandler {
        CrossoverDetectorHandler::new(engine.clone(), IdGenerator::seeded(1_000, 11))
    }

    #[tokio::test]
    async fn test_activate_keeps_engine() {
        let engine = Arc::new(InMemoryEngine::new());
        let id = engine_with_aapl(&engine).await;
        let mut payload = SignalDataPayload::new();

        assert_eq!(handler(&engine).activate(Some(&id), &mut payload).await, Some(id.clone()));
        assert_eq!(payload.ticker(), Some("AAPL"));
        assert_eq!(engine.detector_ids(&id).await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_create_submits_crossover() {
        let engine = Arc::new(InMemoryEngine::new());
        let id = engine_with_aapl(&engine).await;
        let handler = handler(&engine);
        let mut payload = complete_payload();

        let new_id = handler.create(Some(&id), &mut payload).await.unwrap();
        assert_ne!(new_id, id);
        assert_eq!(payload, SignalDataPayload::new());

        let records = engine.signal_detectors(&new_id).await.unwrap();
        let record = &records[1];
        assert_eq!(record.static_name, "Crossover");
        assert_eq!(record.name, "fast over slow");
        assert_eq!(record.config["ticker"], json!("\"AAPL\""));
        assert_eq!(record.config["sentiment"], json!("\"BULLISH\""));
        assert_eq!(record.config["responsive_indicator_getter"]["name"], json!("Identity"));
        assert_eq!(
            record.config["unresponsive_indicator_getter"],
            json!({ "name": "MovingAverage", "config": { "window": 20 } })
        );
        assert!(handler.detector_id(&record.config).is_some());
    }

    #[tokio::test]
    async fn test_create_requires_every_field() {
        let engine = Arc::new(InMemoryEngine::new());
        let id = engine_with_aapl(&engine).await;
        let handler = handler(&engine);

        let incomplete: [fn(&mut SignalDataPayload); 7] = [
            |p: &mut SignalDataPayload| p.name = None,
            |p: &mut SignalDataPayload| p.responsive = None,
            |p: &mut SignalDataPayload| p.unresponsive = None,
            |p: &mut SignalDataPayload| p.ticker = Some(String::new()),
            |p: &mut SignalDataPayload| p.sentiment = None,
            |p: &mut SignalDataPayload| p.sentiment = Some(Sentiment::Neutral),
            |p: &mut SignalDataPayload| p.unresponsive = Some(getter("Identity", Value::Null)),
        ];
        for strip in incomplete {
            let mut payload = complete_payload();
            strip(&mut payload);
            let before = payload.clone();
            assert_eq!(handler.create(Some(&id), &mut payload).await, Some(id.clone()));
            assert_eq!(payload, before);
        }
        assert_eq!(engine.detector_ids(&id).await.unwrap(), vec![3]);
        assert_eq!(handler.create(None, &mut complete_payload()).await, None);
    }

    #[tokio::test]
    async fn test_create_unsupported_keeps_payload() {
        let engine = Arc::new(InMemoryEngine::new().with_supported_detectors(&["Monthly"]));
        let id = engine_with_aapl(&engine).await;
        let mut payload = complete_payload();

        assert_eq!(handler(&engine).create(Some(&id), &mut payload).await, Some(id));
        assert_eq!(payload, complete_payload());
    }

    #[tokio::test]
    async fn test_reconcile_indicators() {
        let engine = Arc::new(InMemoryEngine::new());
        let result = handler(&engine).reconcile_indicators().await.unwrap();
        assert!(result.is_consistent());
    }
}
