//! Seam traits for the visualizer.

mod builder;
mod engine;
mod session;

pub use builder::{DetectorBuilder, DetectorDefinition};
pub use engine::{CreateEngineRequest, EngineApi, StockMarketConfig, TickerConfig};
pub use session::SessionStore;
