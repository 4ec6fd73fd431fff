//! Node-type dispatch table.
//!
//! One generic handler serves every entry of the node-type menu: the selected
//! entry resolves to a [`NodeTypeKey`] which maps onto a graph mutation.

use crate::graph::DetectorGraph;
use serde::{Deserialize, Serialize};
use visualizer_core::{ElementId, GraphError, Phase, Sentiment};

/// What a node-type menu entry does to the selected nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeTypeKey {
    /// Annotate with a signal.
    Signal { sentiment: Sentiment, phase: Phase },
    /// Make the node the initial state.
    Initial,
    /// Revert to a plain transition node.
    Clear,
}

impl NodeTypeKey {
    /// Apply to a single node.
    pub fn apply(self, graph: &mut DetectorGraph, node: ElementId) -> Result<(), GraphError> {
        match self {
            NodeTypeKey::Signal { sentiment, phase } => graph.annotate_node(node, sentiment, phase),
            NodeTypeKey::Initial => graph.set_initial(node),
            NodeTypeKey::Clear => graph.clear_node_type(node),
        }
    }

    /// Apply to every selected node, or to none of them.
    ///
    /// `Initial` needs exactly one selected node.
    pub fn apply_to_selection(
        self,
        graph: &mut DetectorGraph,
        nodes: &[ElementId],
    ) -> Result<(), GraphError> {
        let single_required = self == NodeTypeKey::Initial;
        if nodes.is_empty() || (single_required && nodes.len() != 1) {
            return Err(GraphError::InvalidSelection {
                nodes: nodes.len(),
                edges: 0,
            });
        }
        if let NodeTypeKey::Signal {
            sentiment: Sentiment::Neutral,
            ..
        } = self
        {
            return Err(GraphError::NeutralAnnotation);
        }
        if let Some(&missing) = nodes.iter().find(|&&id| graph.node(id).is_none()) {
            return Err(GraphError::UnknownNode(missing));
        }

        for &node in nodes {
            self.apply(graph, node)?;
        }
        Ok(())
    }
}

/// Labelled node-type entries in menu order.
#[derive(Debug, Clone)]
pub struct NodeTypeMenu {
    entries: Vec<(String, NodeTypeKey)>,
}

impl NodeTypeMenu {
    /// Signal entries for each directional sentiment and phase, then
    /// `Initial` and `None`.
    pub fn new() -> Self {
        let mut entries = Vec::new();
        for &sentiment in Sentiment::directional() {
            for &phase in Phase::all() {
                entries.push((
                    format!("{} {}", sentiment.label(), phase.label()),
                    NodeTypeKey::Signal { sentiment, phase },
                ));
            }
        }
        entries.push(("Initial".to_string(), NodeTypeKey::Initial));
        entries.push(("None".to_string(), NodeTypeKey::Clear));
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, NodeTypeKey)] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn key(&self, label: &str) -> Option<NodeTypeKey> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, key)| *key)
    }

    /// Resolve `label` and apply it to the selected nodes.
    pub fn dispatch(
        &self,
        label: &str,
        graph: &mut DetectorGraph,
        nodes: &[ElementId],
    ) -> Result<(), GraphError> {
        let key = self
            .key(label)
            .ok_or_else(|| GraphError::InvalidElement(format!("unknown node type '{}'", label)))?;
        key.apply_to_selection(graph, nodes)
    }
}

impl Default for NodeTypeMenu {
    fn default() -> Self {
        Self::new()
    }
}
