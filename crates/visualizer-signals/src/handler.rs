//! Detector handler trait.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use tracing::{info, warn};
use visualizer_core::{
    config_id, DetectorId, DetectorSpec, EngineApi, EngineId, GraphError, IdGenerator,
    SignalDataPayload,
};

/// Bridges the UI actions of one detector type to the engine.
///
/// Both actions return the engine identity the UI should show next: the new
/// identity after a successful submission, the given one on refusal, `None`
/// when there is no engine.
#[async_trait]
pub trait DetectorHandler: Send + Sync {
    /// Detector static name, e.g. `Graph`.
    fn name(&self) -> &str;

    /// Name with spaces removed, used as a widget key.
    fn id(&self) -> String {
        self.name().replace(' ', "")
    }

    /// Detector type selected in the UI.
    async fn activate(
        &self,
        engine: Option<&EngineId>,
        payload: &mut SignalDataPayload,
    ) -> Option<EngineId>;

    /// "Add" clicked with the current payload.
    async fn create(
        &self,
        engine: Option<&EngineId>,
        payload: &mut SignalDataPayload,
    ) -> Option<EngineId>;

    /// Id of a detector of this type given its engine configuration.
    fn detector_id(&self, config: &Value) -> Option<DetectorId> {
        config_id(config)
    }
}

/// Draw a detector id not used by any of `taken`.
pub(crate) fn draw_id(
    ids: &Mutex<IdGenerator>,
    taken: impl IntoIterator<Item = DetectorId>,
) -> Result<DetectorId, GraphError> {
    let mut ids = ids
        .lock()
        .map_err(|_| GraphError::InvalidElement("id generator lock poisoned".into()))?;
    ids.next_excluding(taken)
}

/// Draw a free id on `engine` and add a `static_name` detector whose
/// configuration is built from that id.
pub(crate) async fn submit(
    api: &dyn EngineApi,
    ids: &Mutex<IdGenerator>,
    engine: &EngineId,
    static_name: &str,
    config: impl FnOnce(DetectorId) -> String + Send,
) -> Option<EngineId> {
    let taken = match api.detector_ids(engine).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!(%engine, detector = %static_name, error = %e, "Engine could not be resolved");
            return Some(engine.clone());
        }
    };
    let id = match draw_id(ids, taken) {
        Ok(id) => id,
        Err(e) => {
            warn!(%engine, detector = %static_name, error = %e, "No detector id available");
            return Some(engine.clone());
        }
    };

    let spec = DetectorSpec::new(static_name, config(id));
    match api.add_signal_detector(engine, &spec).await {
        Ok(new_engine) => {
            info!(detector = %static_name, id, to = %new_engine, "Detector added");
            Some(new_engine)
        }
        Err(e) => {
            warn!(%engine, detector = %static_name, error = %e, "Engine refused detector");
            Some(engine.clone())
        }
    }
}
