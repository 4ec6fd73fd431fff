//! Core types and traits for the signal detector graph builder.
//!
//! This crate provides the foundational building blocks including:
//! - Graph elements (nodes and edges) with signal annotations
//! - Detector records, specs and engine identities
//! - The session payload holding an in-progress graph
//! - Seam traits for detector builders, the remote engine and session storage
//! - Bounded random id generation

pub mod error;
pub mod ids;
pub mod traits;
pub mod types;

pub use error::{
    BuilderError, CompileError, EngineError, GraphError, SessionError, VisualizerError,
    VisualizerResult,
};
pub use ids::{random_id_excluding, IdGenerator};
pub use traits::*;
pub use types::*;
