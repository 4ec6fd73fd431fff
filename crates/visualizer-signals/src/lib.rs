//! Signal detector handlers.
//!
//! A handler turns the "activate" and "create" actions of one detector type
//! into engine calls:
//! - [`GraphDetectorHandler`]: compiles the edited graph into a `Graph` detector
//! - [`TrivialDetectorHandler`]: config-free detectors applied on activation
//! - [`TickerDetectorHandler`]: detectors watching the selected ticker
//! - [`CrossoverDetectorHandler`]: two indicators crossing on one ticker
//! - [`HandlerRegistry`]: handlers keyed by detector static name

mod crossover;
mod graph;
mod handler;
mod registry;
mod ticker;
mod trivial;

pub use crossover::{CrossoverDetectorHandler, CROSSOVER_DETECTOR_NAME, INDICATORS};
pub use graph::GraphDetectorHandler;
pub use handler::DetectorHandler;
pub use registry::{HandlerRegistry, Reconciliation, TICKER_DETECTORS, TRIVIAL_DETECTORS};
pub use ticker::{ticker_options, TickerDetectorHandler};
pub use trivial::TrivialDetectorHandler;
