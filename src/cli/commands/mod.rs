//! CLI command implementations.

pub mod activate;
pub mod build;
pub mod create;
pub mod detectors;
pub mod edit;
mod payload;
pub mod remove;
pub mod supported;
pub mod validate;
