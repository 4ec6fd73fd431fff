//! Detector and engine identity types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a signal detector configured on an engine.
pub type DetectorId = u64;

/// Static type name of detectors built from a graph.
pub const GRAPH_DETECTOR_NAME: &str = "Graph";

/// Opaque engine identity. Changes on every mutating engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineId(String);

impl EngineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EngineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EngineId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A detector as listed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorRecord {
    /// User-facing name.
    pub name: String,
    /// Detector type, e.g. `Graph` or `Monthly`.
    pub static_name: String,
    /// Type-specific configuration.
    #[serde(default)]
    pub config: Value,
}

impl DetectorRecord {
    /// Detector id carried by the configuration, if any.
    pub fn id(&self) -> Option<DetectorId> {
        config_id(&self.config)
    }
}

/// Extract a detector id from a configuration value.
///
/// Trivial detectors use the bare id as their configuration; structured
/// detectors carry an `id` field, possibly inside a JSON-encoded string.
pub fn config_id(config: &Value) -> Option<DetectorId> {
    match config {
        Value::Number(n) => n.as_u64(),
        Value::Object(map) => map.get("id").and_then(config_id),
        Value::String(s) => s.trim().parse::<DetectorId>().ok().or_else(|| {
            match serde_json::from_str::<Value>(s) {
                Ok(inner @ (Value::Object(_) | Value::Number(_))) => config_id(&inner),
                _ => None,
            }
        }),
        _ => None,
    }
}

/// A detector resolved from the engine, ready to be wired into a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    pub id: DetectorId,
    pub name: String,
    pub static_name: String,
    pub config: Value,
}

impl Detector {
    /// Resolve a record. Records without an id cannot be referenced.
    pub fn from_record(record: DetectorRecord) -> Option<Self> {
        let id = record.id()?;
        Some(Self {
            id,
            name: record.name,
            static_name: record.static_name,
            config: record.config,
        })
    }

    /// Edge label. The trailing blank lines and braille blank keep the label
    /// clear of the edge line when rendered.
    pub fn display_label(&self) -> String {
        format!("{}\n\n\u{2800}", self.name)
    }
}

/// Body of an add-signal-detector request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorSpec {
    pub static_name: String,
    pub config: String,
}

impl DetectorSpec {
    pub fn new(static_name: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            static_name: static_name.into(),
            config: config.into(),
        }
    }

    /// Spec for a graph-built detector.
    pub fn graph(config: impl Into<String>) -> Self {
        Self::new(GRAPH_DETECTOR_NAME, config)
    }

    /// The configuration parsed as JSON, or as a plain string when it is not JSON.
    pub fn config_value(&self) -> Value {
        serde_json::from_str(&self.config).unwrap_or_else(|_| Value::String(self.config.clone()))
    }
}
