//! Graph elements edited by the detector builder UI.

use crate::error::GraphError;
use crate::types::detector::{Detector, DetectorId};
use crate::types::sentiment::{Phase, Sentiment, SignalAnnotation, NEUTRAL_COLOR};
use serde::{Deserialize, Serialize};

/// Identifier shared by nodes and edges of one graph.
pub type ElementId = u64;

/// Role of a node in the detector state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Plain state with no signal semantics.
    #[default]
    TransitionOnly,
    /// The state the detector starts in.
    Initial,
    /// State emitting at least one signal on enter or exit.
    Signal,
}

/// Signal annotations of a node, at most one per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enter: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit: Option<Sentiment>,
}

impl Annotations {
    /// Sentiment annotated for the given phase.
    pub fn get(&self, phase: Phase) -> Option<Sentiment> {
        match phase {
            Phase::Enter => self.enter,
            Phase::Exit => self.exit,
        }
    }

    /// Set the annotation for its phase, returning the replaced sentiment.
    pub fn set(&mut self, annotation: SignalAnnotation) -> Option<Sentiment> {
        let slot = match annotation.phase {
            Phase::Enter => &mut self.enter,
            Phase::Exit => &mut self.exit,
        };
        slot.replace(annotation.sentiment)
    }

    pub fn clear(&mut self) {
        self.enter = None;
        self.exit = None;
    }

    pub fn is_empty(&self) -> bool {
        self.enter.is_none() && self.exit.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Annotations in phase order (enter before exit).
    pub fn iter(&self) -> impl Iterator<Item = SignalAnnotation> + '_ {
        Phase::all()
            .iter()
            .filter_map(|&phase| self.get(phase).map(|s| SignalAnnotation::new(s, phase)))
    }
}

/// A state of the detector graph.
///
/// Role and annotations are kept consistent by the mutators: a `Signal` node
/// always carries at least one annotation and a `TransitionOnly` node none.
/// An `Initial` node may carry annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    id: ElementId,
    label: Option<String>,
    role: NodeRole,
    annotations: Annotations,
}

impl Node {
    /// Create a transition-only node.
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            label: None,
            role: NodeRole::TransitionOnly,
            annotations: Annotations::default(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn is_initial(&self) -> bool {
        self.role == NodeRole::Initial
    }

    /// Display color, taken from the exit annotation.
    pub fn color(&self) -> &'static str {
        self.annotations
            .get(Phase::Exit)
            .map(|s| s.color())
            .unwrap_or(NEUTRAL_COLOR)
    }

    /// Add or replace the annotation for `annotation.phase`.
    pub fn annotate(&mut self, annotation: SignalAnnotation) -> Result<(), GraphError> {
        if annotation.sentiment == Sentiment::Neutral {
            return Err(GraphError::NeutralAnnotation);
        }
        self.annotations.set(annotation);
        if self.role == NodeRole::TransitionOnly {
            self.role = NodeRole::Signal;
        }
        Ok(())
    }

    /// Give this node the initial role. Uniqueness across the graph is the
    /// caller's responsibility.
    pub fn mark_initial(&mut self) {
        self.role = NodeRole::Initial;
    }

    pub fn unmark_initial(&mut self) {
        if self.role == NodeRole::Initial {
            self.role = if self.annotations.is_empty() {
                NodeRole::TransitionOnly
            } else {
                NodeRole::Signal
            };
        }
    }

    /// Drop every annotation and role marker.
    pub fn clear_type(&mut self) {
        self.annotations.clear();
        self.role = NodeRole::TransitionOnly;
    }
}

/// Serialized form of a node. The color is written for renderers and
/// recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default)]
    role: NodeRole,
    #[serde(default)]
    annotations: Annotations,
    #[serde(default, skip_deserializing)]
    color: String,
}

impl TryFrom<NodeRecord> for Node {
    type Error = GraphError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        match record.role {
            NodeRole::Signal if record.annotations.is_empty() => {
                return Err(GraphError::InvalidElement(format!(
                    "signal node {} has no annotations",
                    record.id
                )));
            }
            NodeRole::TransitionOnly if !record.annotations.is_empty() => {
                return Err(GraphError::InvalidElement(format!(
                    "transition node {} carries annotations",
                    record.id
                )));
            }
            _ => {}
        }
        if record.annotations.iter().any(|a| a.sentiment == Sentiment::Neutral) {
            return Err(GraphError::NeutralAnnotation);
        }
        Ok(Self {
            id: record.id,
            label: record.label,
            role: record.role,
            annotations: record.annotations,
        })
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        let color = node.color().to_string();
        Self {
            id: node.id,
            label: node.label,
            role: node.role,
            annotations: node.annotations,
            color,
        }
    }
}

/// Detector attached to an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDetector {
    pub id: DetectorId,
    pub label: String,
}

/// A transition between two states, guarded by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detector: Option<EdgeDetector>,
    #[serde(default = "neutral_color")]
    pub color: String,
}

fn neutral_color() -> String {
    NEUTRAL_COLOR.to_string()
}

impl Edge {
    pub fn new(id: ElementId, source: ElementId, target: ElementId) -> Self {
        Self {
            id,
            source,
            target,
            detector: None,
            color: neutral_color(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Attach `detector`, replacing any previous one.
    pub fn tag(&mut self, detector: &Detector) {
        self.detector = Some(EdgeDetector {
            id: detector.id,
            label: detector.display_label(),
        });
    }

    pub fn detector_id(&self) -> Option<DetectorId> {
        self.detector.as_ref().map(|d| d.id)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A node or an edge of the detector graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GraphElement {
    Node(Node),
    Edge(Edge),
}

impl GraphElement {
    pub fn id(&self) -> ElementId {
        match self {
            GraphElement::Node(n) => n.id(),
            GraphElement::Edge(e) => e.id,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            GraphElement::Node(n) => Some(n),
            GraphElement::Edge(_) => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            GraphElement::Node(n) => Some(n),
            GraphElement::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            GraphElement::Edge(e) => Some(e),
            GraphElement::Node(_) => None,
        }
    }

    pub fn as_edge_mut(&mut self) -> Option<&mut Edge> {
        match self {
            GraphElement::Edge(e) => Some(e),
            GraphElement::Node(_) => None,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, GraphElement::Node(_))
    }
}

impl From<Node> for GraphElement {
    fn from(node: Node) -> Self {
        GraphElement::Node(node)
    }
}

impl From<Edge> for GraphElement {
    fn from(edge: Edge) -> Self {
        GraphElement::Edge(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_replaces_same_phase() {
        let mut node = Node::new(1);
        node.annotate(SignalAnnotation::new(Sentiment::Bullish, Phase::Enter)).unwrap();
        node.annotate(SignalAnnotation::new(Sentiment::Bearish, Phase::Enter)).unwrap();

        let annotations: Vec<_> = node.annotations().iter().collect();
        assert_eq!(
            annotations,
            vec![SignalAnnotation::new(Sentiment::Bearish, Phase::Enter)]
        );
        assert_eq!(node.role(), NodeRole::Signal);
    }

    #[test]
    fn test_color_follows_exit_annotation() {
        let mut node = Node::new(1);
        assert_eq!(node.color(), NEUTRAL_COLOR);

        node.annotate(SignalAnnotation::new(Sentiment::Bullish, Phase::Enter)).unwrap();
        assert_eq!(node.color(), NEUTRAL_COLOR);

        node.annotate(SignalAnnotation::new(Sentiment::Bearish, Phase::Exit)).unwrap();
        assert_eq!(node.color(), "red");
    }

    #[test]
    fn test_neutral_annotation_rejected() {
        let mut node = Node::new(1);
        let result = node.annotate(SignalAnnotation::new(Sentiment::Neutral, Phase::Exit));
        assert_eq!(result, Err(GraphError::NeutralAnnotation));
        assert_eq!(node.role(), NodeRole::TransitionOnly);
    }

    #[test]
    fn test_initial_keeps_annotations() {
        let mut node = Node::new(1);
        node.annotate(SignalAnnotation::new(Sentiment::Bullish, Phase::Exit)).unwrap();
        node.mark_initial();
        assert!(node.is_initial());

        node.unmark_initial();
        assert_eq!(node.role(), NodeRole::Signal);
    }

    #[test]
    fn test_node_serialization_roundtrip() {
        let mut node = Node::new(7);
        node.annotate(SignalAnnotation::new(Sentiment::Bullish, Phase::Exit)).unwrap();
        let element = GraphElement::Node(node.clone());

        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["kind"], "node");
        assert_eq!(json["role"], "signal");
        assert_eq!(json["color"], "green");

        let back: GraphElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn test_signal_node_without_annotations_rejected() {
        let json = serde_json::json!({"kind": "node", "id": 3, "role": "signal"});
        assert!(serde_json::from_value::<GraphElement>(json).is_err());
    }

    #[test]
    fn test_edge_defaults_to_neutral_color() {
        let json = serde_json::json!({"kind": "edge", "id": 3, "source": 1, "target": 2});
        let element: GraphElement = serde_json::from_value(json).unwrap();
        let edge = element.as_edge().unwrap();
        assert_eq!(edge.color, NEUTRAL_COLOR);
        assert!(edge.detector.is_none());
    }
}
