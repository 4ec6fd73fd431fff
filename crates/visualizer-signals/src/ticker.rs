//! Handler for detectors watching a single ticker.

use crate::handler::{submit, DetectorHandler};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use visualizer_core::{EngineApi, EngineId, IdGenerator, SignalDataPayload};

/// Tickers the engine tracks, offered as choices for a ticker-based detector.
///
/// Empty when the engine cannot be resolved.
pub async fn ticker_options(api: &dyn EngineApi, engine: Option<&EngineId>) -> Vec<String> {
    let Some(engine) = engine else {
        return Vec::new();
    };
    match api.tickers(engine).await {
        Ok(tickers) => tickers,
        Err(e) => {
            debug!(%engine, error = %e, "No tickers to offer");
            Vec::new()
        }
    }
}

/// Pre-select the ticker when the engine tracks exactly one.
pub(crate) async fn preselect_ticker(
    api: &dyn EngineApi,
    engine: Option<&EngineId>,
    payload: &mut SignalDataPayload,
) {
    if payload.ticker().is_some() {
        return;
    }
    if let [only] = ticker_options(api, engine).await.as_slice() {
        payload.ticker = Some(only.clone());
    }
}

/// JSON-encode a string a second time, as the engine expects for nested
/// string settings.
pub(crate) fn encoded(value: &str) -> Value {
    Value::String(Value::String(value.to_string()).to_string())
}

/// Adds a detector of type `name` configured with the selected ticker.
///
/// Used for `Golden Cross` and `Death Cross`.
pub struct TickerDetectorHandler {
    name: String,
    engine: Arc<dyn EngineApi>,
    ids: Mutex<IdGenerator>,
}

impl TickerDetectorHandler {
    pub fn new(name: impl Into<String>, engine: Arc<dyn EngineApi>, ids: IdGenerator) -> Self {
        Self {
            name: name.into(),
            engine,
            ids: Mutex::new(ids),
        }
    }
}

#[async_trait]
impl DetectorHandler for TickerDetectorHandler {
    fn name(&self) -> &str {
        &self.name
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
        let Some(ticker) = payload.ticker().map(str::to_string) else {
            warn!(detector = %self.name, "No ticker selected");
            return Some(engine.clone());
        };

        submit(self.engine.as_ref(), &self.ids, engine, &self.name, |id| {
            json!({ "id": id, "ticker": encoded(&ticker) }).to_string()
        })
        .await
    }
}
