//! Finite-state detector builder trait.

use crate::error::BuilderError;
use crate::types::{Detector, DetectorId, ElementId, Phase, Sentiment};

/// Accumulates states, signal descriptions and transitions and produces an
/// immutable detector definition.
///
/// States must be declared before they are referenced, and a detector must be
/// registered before a transition uses it.
pub trait DetectorBuilder {
    /// The definition produced by [`DetectorBuilder::build`].
    type Output: DetectorDefinition;

    /// Declare a state.
    fn add_state(&mut self, state: ElementId) -> Result<(), BuilderError>;

    /// Mark a declared state as the initial one.
    fn set_initial_state(&mut self, state: ElementId) -> Result<(), BuilderError>;

    /// Emit a signal with `sentiment` when `state` is entered or exited.
    fn add_signal_description(
        &mut self,
        state: ElementId,
        sentiment: Sentiment,
        phase: Phase,
    ) -> Result<(), BuilderError>;

    /// Register a detector that guards transitions.
    fn add_detector(&mut self, detector: Detector) -> Result<(), BuilderError>;

    /// Move from `source` to `target` when `detector` fires.
    fn add_transition(
        &mut self,
        source: ElementId,
        target: ElementId,
        detector: DetectorId,
    ) -> Result<(), BuilderError>;

    /// Produce the definition.
    fn build(self) -> Result<Self::Output, BuilderError>;
}

/// A built detector, serializable into an engine configuration string.
pub trait DetectorDefinition {
    fn id(&self) -> DetectorId;

    fn name(&self) -> &str;

    /// Configuration string submitted to the engine.
    fn to_config(&self) -> Result<String, BuilderError>;
}
