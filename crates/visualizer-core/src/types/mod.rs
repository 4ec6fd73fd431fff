//! Core data types for the visualizer.

mod detector;
mod element;
mod payload;
mod sentiment;

pub use detector::{
    config_id, Detector, DetectorId, DetectorRecord, DetectorSpec, EngineId, GRAPH_DETECTOR_NAME,
};
pub use element::{Annotations, Edge, EdgeDetector, ElementId, GraphElement, Node, NodeRole};
pub use payload::{IndicatorGetter, IndicatorSlot, SessionId, SignalDataPayload};
pub use sentiment::{Phase, Sentiment, SignalAnnotation, NEUTRAL_COLOR};
