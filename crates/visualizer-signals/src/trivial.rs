//! Handler for detectors without configuration.

use crate::handler::{submit, DetectorHandler};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use visualizer_core::{EngineApi, EngineId, IdGenerator, SignalDataPayload};

/// Adds a config-free detector as soon as its type is selected.
///
/// The configuration is the detector id alone.
pub struct TrivialDetectorHandler {
    name: String,
    engine: Arc<dyn EngineApi>,
    ids: Mutex<IdGenerator>,
}

impl TrivialDetectorHandler {
    pub fn new(name: impl Into<String>, engine: Arc<dyn EngineApi>, ids: IdGenerator) -> Self {
        Self {
            name: name.into(),
            engine,
            ids: Mutex::new(ids),
        }
    }
}

#[async_trait]
impl DetectorHandler for TrivialDetectorHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn activate(
        &self,
        engine: Option<&EngineId>,
        _payload: &mut SignalDataPayload,
    ) -> Option<EngineId> {
        let engine = engine?;
        submit(self.engine.as_ref(), &self.ids, engine, &self.name, |id| id.to_string()).await
    }

    /// Nothing to configure.
    async fn create(
        &self,
        engine: Option<&EngineId>,
        _payload: &mut SignalDataPayload,
    ) -> Option<EngineId> {
        engine.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use visualizer_core::{CreateEngineRequest, DetectorSpec};
    use visualizer_engine::InMemoryEngine;

    #[tokio::test]
    async fn test_activate_adds_detector() {
        let engine = Arc::new(InMemoryEngine::new());
        let request = CreateEngineRequest::new(
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            &[],
            vec![DetectorSpec::new("Monthly", "0")],
        );
        let id = engine.create_engine(&request).await.unwrap();
        // Two ids in total and one taken: the draw must pick the other.
        let handler = TrivialDetectorHandler::new("BiMonthly", engine.clone(), IdGenerator::seeded(2, 3));
        let mut payload = SignalDataPayload::new();

        let new_id = handler.activate(Some(&id), &mut payload).await.unwrap();
        assert_ne!(new_id, id);
        assert_eq!(engine.detector_ids(&new_id).await.unwrap(), vec![0, 1]);

        let records = engine.signal_detectors(&new_id).await.unwrap();
        assert_eq!(records[1].static_name, "BiMonthly");
        assert_eq!(handler.detector_id(&records[1].config), Some(1));

        // The id space is now full.
        assert_eq!(handler.activate(Some(&new_id), &mut payload).await, Some(new_id.clone()));
        assert_eq!(handler.create(Some(&new_id), &mut payload).await, Some(new_id));
    }

    #[tokio::test]
    async fn test_activate_without_engine() {
        let engine = Arc::new(InMemoryEngine::new());
        let handler = TrivialDetectorHandler::new("Monthly", engine, IdGenerator::seeded(10, 1));
        let mut payload = SignalDataPayload::new();

        assert_eq!(handler.activate(None, &mut payload).await, None);
        let stale = EngineId::from("gone");
        assert_eq!(handler.activate(Some(&stale), &mut payload).await, Some(stale));
    }
}
