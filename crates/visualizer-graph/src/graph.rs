//! The detector graph and its mutation operations.

use std::collections::HashSet;
use tracing::debug;
use visualizer_core::{
    Detector, Edge, ElementId, GraphElement, GraphError, IdGenerator, Node, Phase, Sentiment,
    SignalAnnotation, NEUTRAL_COLOR,
};

/// Node/edge collection edited by the user.
///
/// Nodes and edges share one id space. At most one node holds the initial
/// role. Removing a node does not remove the edges incident on it; such
/// dangling edges are reported by [`DetectorGraph::dangling_edges`] and
/// rejected at compile time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorGraph {
    elements: Vec<GraphElement>,
}

impl DetectorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap stored elements, checking id uniqueness and the single initial node.
    pub fn from_elements(elements: Vec<GraphElement>) -> Result<Self, GraphError> {
        let mut seen = HashSet::new();
        let mut initial: Option<ElementId> = None;

        for element in &elements {
            if !seen.insert(element.id()) {
                return Err(GraphError::DuplicateId(element.id()));
            }
            if let Some(node) = element.as_node().filter(|n| n.is_initial()) {
                if let Some(first) = initial {
                    return Err(GraphError::MultipleInitial {
                        first,
                        second: node.id(),
                    });
                }
                initial = Some(node.id());
            }
        }

        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[GraphElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<GraphElement> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Ids of every node and edge.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().map(GraphElement::id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids().any(|existing| existing == id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.elements.iter().filter_map(GraphElement::as_node)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.elements.iter().filter_map(GraphElement::as_edge)
    }

    pub fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes().find(|n| n.id() == id)
    }

    pub fn edge(&self, id: ElementId) -> Option<&Edge> {
        self.edges().find(|e| e.id == id)
    }

    pub fn initial_node(&self) -> Option<&Node> {
        self.nodes().find(|n| n.is_initial())
    }

    /// Edges leaving `node`.
    pub fn outgoing(&self, node: ElementId) -> impl Iterator<Item = &Edge> {
        self.edges().filter(move |e| e.source == node)
    }

    /// Edges whose source or target no longer exists.
    pub fn dangling_edges(&self) -> Vec<ElementId> {
        let nodes: HashSet<ElementId> = self.nodes().map(Node::id).collect();
        self.edges()
            .filter(|e| !nodes.contains(&e.source) || !nodes.contains(&e.target))
            .map(|e| e.id)
            .collect()
    }

    fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.elements.iter_mut().filter_map(GraphElement::as_node_mut)
    }

    fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.elements.iter_mut().filter_map(GraphElement::as_edge_mut)
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node, GraphError> {
        self.nodes_mut()
            .find(|n| n.id() == id)
            .ok_or(GraphError::UnknownNode(id))
    }

    fn recolor_outgoing(&mut self, node: ElementId, color: &str) {
        for edge in self.edges_mut().filter(|e| e.source == node) {
            edge.color = color.to_string();
        }
    }

    /// Append a transition-only node with a fresh id.
    pub fn add_node(&mut self, ids: &mut IdGenerator) -> Result<ElementId, GraphError> {
        let id = ids.next_excluding(self.ids())?;
        self.elements.push(Node::new(id).into());
        debug!(node = id, "Node added");
        Ok(id)
    }

    /// Remove every element whose id is selected. Incident edges of removed
    /// nodes are kept unless selected too.
    ///
    /// Returns the number of removed elements.
    pub fn remove_selected(&mut self, nodes: &[ElementId], edges: &[ElementId]) -> usize {
        if nodes.is_empty() && edges.is_empty() {
            return 0;
        }
        let selected: HashSet<ElementId> = nodes.iter().chain(edges).copied().collect();
        let before = self.elements.len();
        self.elements.retain(|e| !selected.contains(&e.id()));

        let removed = before - self.elements.len();
        debug!(removed, "Elements removed");
        removed
    }

    /// Add or replace the `(sentiment, phase)` annotation of a node.
    ///
    /// An enter annotation recolors the node's outgoing edges.
    pub fn annotate_node(
        &mut self,
        node: ElementId,
        sentiment: Sentiment,
        phase: Phase,
    ) -> Result<(), GraphError> {
        self.node_mut(node)?
            .annotate(SignalAnnotation::new(sentiment, phase))?;
        if phase == Phase::Enter {
            self.recolor_outgoing(node, sentiment.color());
        }
        debug!(node, %sentiment, %phase, "Node annotated");
        Ok(())
    }

    /// Make `node` the only initial node.
    pub fn set_initial(&mut self, node: ElementId) -> Result<(), GraphError> {
        if self.node(node).is_none() {
            return Err(GraphError::UnknownNode(node));
        }
        for n in self.nodes_mut() {
            if n.id() == node {
                n.mark_initial();
            } else {
                n.unmark_initial();
            }
        }
        debug!(node, "Initial node set");
        Ok(())
    }

    /// Revert a node to transition-only and reset its outgoing edge colors.
    pub fn clear_node_type(&mut self, node: ElementId) -> Result<(), GraphError> {
        self.node_mut(node)?.clear_type();
        self.recolor_outgoing(node, NEUTRAL_COLOR);
        debug!(node, "Node type cleared");
        Ok(())
    }

    /// Attach `detector` to the selection.
    ///
    /// With edges selected, those edges are re-tagged. Otherwise one or two
    /// selected nodes get a new edge from the first to the second (a self-loop
    /// for a single node). Any other selection is refused.
    ///
    /// Returns the ids of the tagged edges.
    pub fn attach_detector(
        &mut self,
        nodes: &[ElementId],
        edges: &[ElementId],
        detector: &Detector,
        ids: &mut IdGenerator,
    ) -> Result<Vec<ElementId>, GraphError> {
        if !edges.is_empty() {
            if let Some(&missing) = edges.iter().find(|&&id| self.edge(id).is_none()) {
                return Err(GraphError::UnknownEdge(missing));
            }
            let mut tagged = Vec::new();
            for edge in self.edges_mut().filter(|e| edges.contains(&e.id)) {
                edge.tag(detector);
                tagged.push(edge.id);
            }
            debug!(detector = detector.id, edges = ?tagged, "Edges re-tagged");
            return Ok(tagged);
        }

        let (source, target) = match nodes {
            [only] => (*only, *only),
            [first, second] => (*first, *second),
            _ => {
                return Err(GraphError::InvalidSelection {
                    nodes: nodes.len(),
                    edges: edges.len(),
                })
            }
        };
        for endpoint in [source, target] {
            if self.node(endpoint).is_none() {
                return Err(GraphError::UnknownNode(endpoint));
            }
        }

        let id = ids.next_excluding(self.ids())?;
        let mut edge = Edge::new(id, source, target).with_color(self.edge_color(source, target));
        edge.tag(detector);
        self.elements.push(edge.into());

        debug!(edge = id, source, target, detector = detector.id, "Edge added");
        Ok(vec![id])
    }

    /// Color for a new edge: the source's exit sentiment, else the target's,
    /// else neutral.
    fn edge_color(&self, source: ElementId, target: ElementId) -> &'static str {
        [source, target]
            .iter()
            .filter_map(|&id| self.node(id))
            .find_map(|n| n.annotations().get(Phase::Exit))
            .map(|s| s.color())
            .unwrap_or(NEUTRAL_COLOR)
    }
}
