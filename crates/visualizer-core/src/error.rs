//! Error types for the visualizer.

use crate::types::{DetectorId, ElementId, SessionId};
use thiserror::Error;

/// Top-level visualizer error.
#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by graph mutation operations.
///
/// Every variant is a refusal: the graph is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Invalid selection: {nodes} node(s) and {edges} edge(s) selected")]
    InvalidSelection { nodes: usize, edges: usize },

    #[error("Node not found: {0}")]
    UnknownNode(ElementId),

    #[error("Edge not found: {0}")]
    UnknownEdge(ElementId),

    #[error("Duplicate element id: {0}")]
    DuplicateId(ElementId),

    #[error("More than one initial node: {first} and {second}")]
    MultipleInitial { first: ElementId, second: ElementId },

    #[error("Neutral sentiment cannot annotate a node")]
    NeutralAnnotation,

    #[error("Id space exhausted: all {max} ids are in use")]
    IdSpaceExhausted { max: u64 },

    #[error("Invalid element: {0}")]
    InvalidElement(String),
}

/// Precondition failures reported by a detector builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("State already declared: {0}")]
    DuplicateState(ElementId),

    #[error("State not declared: {0}")]
    UnknownState(ElementId),

    #[error("Initial state already set to {0}")]
    InitialStateAlreadySet(ElementId),

    #[error("No initial state set")]
    MissingInitialState,

    #[error("Detector already registered: {0}")]
    DuplicateDetector(DetectorId),

    #[error("Detector not registered: {0}")]
    UnknownDetector(DetectorId),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Reasons a graph is refused by the compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Detector name is missing")]
    MissingName,

    #[error("Graph has no initial state")]
    MissingInitialState,

    #[error("Detector {0} is not configured on the engine")]
    UnknownDetector(DetectorId),

    #[error("Builder rejected the graph: {0}")]
    Builder(#[from] BuilderError),
}

/// Remote engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Engine not found: {0}")]
    UnknownEngine(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Engine error: {0}")]
    Internal(String),
}

/// Session payload storage errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Session store error: {0}")]
    Internal(String),
}

/// Result type alias for visualizer operations.
pub type VisualizerResult<T> = Result<T, VisualizerError>;
