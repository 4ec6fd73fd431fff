//! Handler for detectors built in the graph editor.

use crate::handler::{draw_id, DetectorHandler};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use visualizer_core::{
    DetectorRecord, EngineApi, EngineId, IdGenerator, SignalDataPayload, GRAPH_DETECTOR_NAME,
};
use visualizer_graph::{DetectorCatalog, GraphCompiler, StateMachineBuilder};

/// Compiles the session graph and submits it as a `Graph` detector.
pub struct GraphDetectorHandler {
    engine: Arc<dyn EngineApi>,
    ids: Mutex<IdGenerator>,
}

impl GraphDetectorHandler {
    pub fn new(engine: Arc<dyn EngineApi>, ids: IdGenerator) -> Self {
        Self {
            engine,
            ids: Mutex::new(ids),
        }
    }
}

#[async_trait]
impl DetectorHandler for GraphDetectorHandler {
    fn name(&self) -> &str {
        GRAPH_DETECTOR_NAME
    }

    /// Start from an empty graph. Nothing reaches the engine until `create`.
    async fn activate(
        &self,
        engine: Option<&EngineId>,
        payload: &mut SignalDataPayload,
    ) -> Option<EngineId> {
        payload.reset();
        engine.cloned()
    }

    async fn create(
        &self,
        engine: Option<&EngineId>,
        payload: &mut SignalDataPayload,
    ) -> Option<EngineId> {
        let Some(engine) = engine else {
            warn!("No engine to add the graph detector to");
            return None;
        };

        let records = match self.engine.signal_detectors(engine).await {
            Ok(records) => records,
            Err(e) => {
                warn!(%engine, error = %e, "Engine could not be resolved");
                return Some(engine.clone());
            }
        };
        let taken: Vec<_> = records.iter().filter_map(DetectorRecord::id).collect();
        let catalog = DetectorCatalog::from_records(records);

        let id = match draw_id(&self.ids, taken) {
            Ok(id) => id,
            Err(e) => {
                warn!(%engine, error = %e, "No detector id available");
                return Some(engine.clone());
            }
        };

        let spec = match GraphCompiler::new(&catalog).compile(
            &payload.graph,
            payload.name.as_deref(),
            |name| StateMachineBuilder::new(id, name),
        ) {
            Ok(spec) => spec,
            Err(e) => {
                warn!(%engine, error = %e, "Graph detector refused");
                return Some(engine.clone());
            }
        };

        match self.engine.add_signal_detector(engine, &spec).await {
            Ok(new_engine) => {
                info!(detector = id, from = %engine, to = %new_engine, "Graph detector added");
                payload.reset();
                Some(new_engine)
            }
            Err(e) => {
                warn!(%engine, error = %e, "Engine refused graph detector");
                Some(engine.clone())
            }
        }
    }
}
