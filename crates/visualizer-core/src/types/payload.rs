//! Session-scoped payload of the graph detector editor.

use crate::types::element::GraphElement;
use crate::types::sentiment::Sentiment;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An indicator chosen for one side of a crossover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorGetter {
    /// Indicator type, e.g. `MovingAverage`.
    pub name: String,
    /// Indicator arguments as the engine expects them.
    #[serde(default)]
    pub config: Value,
}

/// Which side of a crossover an indicator feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSlot {
    Responsive,
    Unresponsive,
}

impl FromStr for IndicatorSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "responsive" => Ok(IndicatorSlot::Responsive),
            "unresponsive" => Ok(IndicatorSlot::Unresponsive),
            other => Err(format!("Unknown indicator slot: {}", other)),
        }
    }
}

/// Detector settings being edited in one session: the graph and custom name
/// of a graph detector, and the fields of the ticker and crossover forms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalDataPayload {
    #[serde(default)]
    pub graph: Vec<GraphElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<IndicatorGetter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresponsive: Option<IndicatorGetter>,
}

impl SignalDataPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload holding only a graph and a name.
    pub fn with_graph(graph: Vec<GraphElement>, name: Option<String>) -> Self {
        Self {
            graph,
            name,
            ..Self::default()
        }
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The custom name, if set to something other than whitespace.
    pub fn detector_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// The selected ticker, if non-empty.
    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn indicator(&self, slot: IndicatorSlot) -> Option<&IndicatorGetter> {
        match slot {
            IndicatorSlot::Responsive => self.responsive.as_ref(),
            IndicatorSlot::Unresponsive => self.unresponsive.as_ref(),
        }
    }

    pub fn set_indicator(&mut self, slot: IndicatorSlot, getter: Option<IndicatorGetter>) {
        match slot {
            IndicatorSlot::Responsive => self.responsive = getter,
            IndicatorSlot::Unresponsive => self.unresponsive = getter,
        }
    }
}
