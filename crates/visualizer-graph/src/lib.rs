//! Detector graph editing and compilation.
//!
//! This crate provides:
//! - [`DetectorGraph`]: the node/edge collection and its mutation operations
//! - [`NodeTypeMenu`]: the node-type dispatch table
//! - [`GraphEditor`]: UI events applied to a session-scoped payload
//! - [`GraphCompiler`]: translation of a graph into detector builder calls
//! - [`StateMachineBuilder`]: a builder producing a serializable state machine

mod compiler;
mod editor;
mod graph;
mod machine;
mod menu;
mod session;

pub use compiler::{DetectorCatalog, DetectorLookup, GraphCompiler};
pub use editor::{EditorEvent, GraphEditor};
pub use graph::DetectorGraph;
pub use machine::{StateDescription, StateMachineBuilder, StateMachineDefinition, Transition};
pub use menu::{NodeTypeKey, NodeTypeMenu};
pub use session::{MemorySessionStore, DEFAULT_MAX_SESSIONS};
