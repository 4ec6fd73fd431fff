//! Stock market engine API implementations.
//!
//! - [`HttpEngine`]: client for the remote engine REST service
//! - [`InMemoryEngine`]: local engine keeping immutable snapshots, for
//!   simulation and tests

mod http;
mod memory;

pub use http::{paths, HttpEngine, HttpEngineConfig};
pub use memory::{InMemoryEngine, DEFAULT_MAX_SNAPSHOTS};
