//! Logging setup.

mod logging;

pub use logging::{filter_directive, setup_logging, LogFormat};
