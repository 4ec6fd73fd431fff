//! Session payload files.

use anyhow::{Context as _, Result};
use std::io::ErrorKind;
use std::path::Path;
use visualizer_core::SignalDataPayload;

pub fn read_payload(path: &Path) -> Result<SignalDataPayload> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid detector payload in {}", path.display()))
}

/// Like [`read_payload`], but a missing file is an empty payload.
pub fn read_payload_or_default(path: &Path) -> Result<SignalDataPayload> {
    match std::fs::metadata(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(SignalDataPayload::new()),
        _ => read_payload(path),
    }
}

pub fn write_payload(path: &Path, payload: &SignalDataPayload) -> Result<()> {
    let raw = serde_json::to_string_pretty(payload).context("Failed to encode payload")?;
    std::fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))
}
