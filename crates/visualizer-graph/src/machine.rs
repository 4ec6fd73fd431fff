//! State-machine detector builder.

use serde::{Deserialize, Serialize};
use visualizer_core::{
    BuilderError, Detector, DetectorBuilder, DetectorDefinition, DetectorId, DetectorRecord,
    ElementId, Phase, Sentiment, SignalAnnotation,
};

/// A state and the signals it emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDescription {
    pub id: ElementId,
    #[serde(default)]
    pub signals: Vec<SignalAnnotation>,
}

/// A detector-guarded move between two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub source: ElementId,
    pub target: ElementId,
    pub detector: DetectorId,
}

/// Immutable state-machine detector, serialized as the engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineDefinition {
    pub id: DetectorId,
    pub name: String,
    pub initial_state: ElementId,
    pub states: Vec<StateDescription>,
    pub detectors: Vec<DetectorRecord>,
    pub transitions: Vec<Transition>,
}

impl StateMachineDefinition {
    pub fn state(&self, id: ElementId) -> Option<&StateDescription> {
        self.states.iter().find(|s| s.id == id)
    }
}

impl DetectorDefinition for StateMachineDefinition {
    fn id(&self) -> DetectorId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_config(&self) -> Result<String, BuilderError> {
        serde_json::to_string(self).map_err(|e| BuilderError::Serialization(e.to_string()))
    }
}

/// Builder checking the ordering preconditions of [`DetectorBuilder`].
#[derive(Debug, Clone)]
pub struct StateMachineBuilder {
    id: DetectorId,
    name: String,
    states: Vec<StateDescription>,
    initial: Option<ElementId>,
    detectors: Vec<Detector>,
    transitions: Vec<Transition>,
}

impl StateMachineBuilder {
    pub fn new(id: DetectorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            states: Vec::new(),
            initial: None,
            detectors: Vec::new(),
            transitions: Vec::new(),
        }
    }

    fn state_mut(&mut self, state: ElementId) -> Result<&mut StateDescription, BuilderError> {
        self.states
            .iter_mut()
            .find(|s| s.id == state)
            .ok_or(BuilderError::UnknownState(state))
    }

    fn has_state(&self, state: ElementId) -> bool {
        self.states.iter().any(|s| s.id == state)
    }

    fn has_detector(&self, detector: DetectorId) -> bool {
        self.detectors.iter().any(|d| d.id == detector)
    }
}

impl DetectorBuilder for StateMachineBuilder {
    type Output = StateMachineDefinition;

    fn add_state(&mut self, state: ElementId) -> Result<(), BuilderError> {
        if self.has_state(state) {
            return Err(BuilderError::DuplicateState(state));
        }
        self.states.push(StateDescription {
            id: state,
            signals: Vec::new(),
        });
        Ok(())
    }

    fn set_initial_state(&mut self, state: ElementId) -> Result<(), BuilderError> {
        if !self.has_state(state) {
            return Err(BuilderError::UnknownState(state));
        }
        if let Some(initial) = self.initial {
            return Err(BuilderError::InitialStateAlreadySet(initial));
        }
        self.initial = Some(state);
        Ok(())
    }

    fn add_signal_description(
        &mut self,
        state: ElementId,
        sentiment: Sentiment,
        phase: Phase,
    ) -> Result<(), BuilderError> {
        let description = self.state_mut(state)?;
        description.signals.retain(|s| s.phase != phase);
        description.signals.push(SignalAnnotation::new(sentiment, phase));
        Ok(())
    }

    fn add_detector(&mut self, detector: Detector) -> Result<(), BuilderError> {
        if self.has_detector(detector.id) {
            return Err(BuilderError::DuplicateDetector(detector.id));
        }
        self.detectors.push(detector);
        Ok(())
    }

    fn add_transition(
        &mut self,
        source: ElementId,
        target: ElementId,
        detector: DetectorId,
    ) -> Result<(), BuilderError> {
        for state in [source, target] {
            if !self.has_state(state) {
                return Err(BuilderError::UnknownState(state));
            }
        }
        if !self.has_detector(detector) {
            return Err(BuilderError::UnknownDetector(detector));
        }
        self.transitions.push(Transition {
            source,
            target,
            detector,
        });
        Ok(())
    }

    fn build(self) -> Result<StateMachineDefinition, BuilderError> {
        let initial_state = self.initial.ok_or(BuilderError::MissingInitialState)?;
        Ok(StateMachineDefinition {
            id: self.id,
            name: self.name,
            initial_state,
            states: self.states,
            detectors: self
                .detectors
                .into_iter()
                .map(|d| DetectorRecord {
                    name: d.name,
                    static_name: d.static_name,
                    config: d.config,
                })
                .collect(),
            transitions: self.transitions,
        })
    }
}
