//! Session-backed graph editor.
//!
//! Each UI event maps onto one graph operation applied to the payload stored
//! for the session. A refused operation leaves the stored payload untouched.

use crate::graph::DetectorGraph;
use crate::menu::{NodeTypeKey, NodeTypeMenu};
use tracing::warn;
use visualizer_core::{
    Detector, ElementId, GraphError, IdGenerator, IndicatorGetter, IndicatorSlot, Sentiment,
    SessionError, SessionId, SessionStore, SignalDataPayload,
};

/// Discrete UI event of the graph detector editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// "Add node" clicked.
    AddNode,
    /// "Remove" clicked with the current selection.
    Remove {
        nodes: Vec<ElementId>,
        edges: Vec<ElementId>,
    },
    /// "Add detector" clicked with the current selection.
    AttachDetector {
        nodes: Vec<ElementId>,
        edges: Vec<ElementId>,
        detector: Detector,
    },
    /// Node-type menu entry selected.
    NodeType {
        key: NodeTypeKey,
        nodes: Vec<ElementId>,
    },
    /// Custom detector name entered.
    SetName(Option<String>),
    /// Ticker picked for a ticker-based detector.
    SetTicker(Option<String>),
    /// Crossover sentiment picked.
    SetSentiment(Option<Sentiment>),
    /// Crossover indicator created for one side.
    SetIndicator {
        slot: IndicatorSlot,
        getter: Option<IndicatorGetter>,
    },
    /// Every field cleared.
    Reset,
}

/// Applies editor events to session payloads.
pub struct GraphEditor<S: SessionStore> {
    store: S,
    ids: IdGenerator,
    menu: NodeTypeMenu,
}

impl<S: SessionStore> GraphEditor<S> {
    pub fn new(store: S, ids: IdGenerator) -> Self {
        Self {
            store,
            ids,
            menu: NodeTypeMenu::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn menu(&self) -> &NodeTypeMenu {
        &self.menu
    }

    /// Current payload of a session.
    pub fn payload(&self, session: &SessionId) -> Result<SignalDataPayload, SessionError> {
        self.store.load_or_default(session)
    }

    /// Apply `event` and return the resulting payload.
    ///
    /// Refusals are logged and yield the unchanged payload; only storage
    /// failures are returned as errors.
    pub fn handle(
        &mut self,
        session: &SessionId,
        event: EditorEvent,
    ) -> Result<SignalDataPayload, SessionError> {
        let payload = self.store.load_or_default(session)?;
        match self.apply(&payload, event) {
            Ok(next) => {
                self.store.store(session, next.clone())?;
                Ok(next)
            }
            Err(e) => {
                warn!(%session, error = %e, "Editor action refused");
                Ok(payload)
            }
        }
    }

    /// Resolve a node-type menu label and apply it to the selected nodes.
    pub fn select_node_type(
        &mut self,
        session: &SessionId,
        label: &str,
        nodes: Vec<ElementId>,
    ) -> Result<SignalDataPayload, SessionError> {
        match self.menu.key(label) {
            Some(key) => self.handle(session, EditorEvent::NodeType { key, nodes }),
            None => {
                warn!(%session, label, "Unknown node type");
                self.payload(session)
            }
        }
    }

    fn apply(
        &mut self,
        payload: &SignalDataPayload,
        event: EditorEvent,
    ) -> Result<SignalDataPayload, GraphError> {
        let mut next = payload.clone();
        match event {
            EditorEvent::SetName(name) => next.name = name,
            EditorEvent::SetTicker(ticker) => next.ticker = ticker,
            EditorEvent::SetSentiment(Some(Sentiment::Neutral)) => {
                return Err(GraphError::NeutralAnnotation)
            }
            EditorEvent::SetSentiment(sentiment) => next.sentiment = sentiment,
            EditorEvent::SetIndicator { slot, getter } => next.set_indicator(slot, getter),
            EditorEvent::Reset => next.reset(),
            event => {
                let mut graph = DetectorGraph::from_elements(std::mem::take(&mut next.graph))?;
                self.apply_to_graph(&mut graph, event)?;
                next.graph = graph.into_elements();
            }
        }
        Ok(next)
    }

    fn apply_to_graph(
        &mut self,
        graph: &mut DetectorGraph,
        event: EditorEvent,
    ) -> Result<(), GraphError> {
        match event {
            EditorEvent::AddNode => {
                graph.add_node(&mut self.ids)?;
            }
            EditorEvent::Remove { nodes, edges } => {
                graph.remove_selected(&nodes, &edges);
            }
            EditorEvent::AttachDetector {
                nodes,
                edges,
                detector,
            } => {
                graph.attach_detector(&nodes, &edges, &detector, &mut self.ids)?;
            }
            EditorEvent::NodeType { key, nodes } => key.apply_to_selection(graph, &nodes)?,
            EditorEvent::SetName(_)
            | EditorEvent::SetTicker(_)
            | EditorEvent::SetSentiment(_)
            | EditorEvent::SetIndicator { .. }
            | EditorEvent::Reset => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use serde_json::json;
    use visualizer_core::{GraphElement, NodeRole, Phase, Sentiment};

    fn editor() -> GraphEditor<MemorySessionStore> {
        GraphEditor::new(MemorySessionStore::default(), IdGenerator::seeded(10_000, 21))
    }

    fn node_ids(payload: &SignalDataPayload) -> Vec<ElementId> {
        payload
            .graph
            .iter()
            .filter(|e| e.is_node())
            .map(GraphElement::id)
            .collect()
    }

    #[test]
    fn test_build_graph_through_events() {
        let mut editor = editor();
        let session = SessionId::new();

        editor.handle(&session, EditorEvent::AddNode).unwrap();
        let payload = editor.handle(&session, EditorEvent::AddNode).unwrap();
        let nodes = node_ids(&payload);
        assert_eq!(nodes.len(), 2);

        editor
            .select_node_type(&session, "Initial", vec![nodes[0]])
            .unwrap();
        editor
            .select_node_type(&session, "Bullish exit", vec![nodes[1]])
            .unwrap();
        let detector = Detector {
            id: 3,
            name: "golden".to_string(),
            static_name: "Golden Cross".to_string(),
            config: json!({"id": 3}),
        };
        editor
            .handle(
                &session,
                EditorEvent::AttachDetector {
                    nodes: nodes.clone(),
                    edges: vec![],
                    detector,
                },
            )
            .unwrap();
        let payload = editor
            .handle(&session, EditorEvent::SetName(Some("trend".to_string())))
            .unwrap();

        let graph = DetectorGraph::from_elements(payload.graph.clone()).unwrap();
        assert_eq!(graph.initial_node().map(|n| n.id()), Some(nodes[0]));
        assert_eq!(graph.node(nodes[1]).unwrap().role(), NodeRole::Signal);
        assert_eq!(graph.edges().count(), 1);
        assert_eq!(payload.detector_name(), Some("trend"));
        assert_eq!(editor.payload(&session).unwrap(), payload);
    }

    #[test]
    fn test_refused_event_keeps_payload() {
        let mut editor = editor();
        let session = SessionId::new();
        let before = editor.handle(&session, EditorEvent::AddNode).unwrap();

        let after = editor
            .handle(
                &session,
                EditorEvent::NodeType {
                    key: NodeTypeKey::Signal {
                        sentiment: Sentiment::Bullish,
                        phase: Phase::Enter,
                    },
                    nodes: vec![],
                },
            )
            .unwrap();

        assert_eq!(after, before);
        assert_eq!(editor.payload(&session).unwrap(), before);
    }

    #[test]
    fn test_unknown_menu_label_is_ignored() {
        let mut editor = editor();
        let session = SessionId::new();
        let before = editor.handle(&session, EditorEvent::AddNode).unwrap();
        let nodes = node_ids(&before);

        let after = editor.select_node_type(&session, "Sideways", nodes).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_remove_and_reset() {
        let mut editor = editor();
        let session = SessionId::new();
        editor.handle(&session, EditorEvent::AddNode).unwrap();
        let payload = editor.handle(&session, EditorEvent::AddNode).unwrap();
        let nodes = node_ids(&payload);

        let payload = editor
            .handle(
                &session,
                EditorEvent::Remove {
                    nodes: vec![nodes[0]],
                    edges: vec![],
                },
            )
            .unwrap();
        assert_eq!(node_ids(&payload), vec![nodes[1]]);

        editor
            .handle(&session, EditorEvent::SetName(Some("x".to_string())))
            .unwrap();
        let payload = editor.handle(&session, EditorEvent::Reset).unwrap();
        assert_eq!(payload, SignalDataPayload::new());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut editor = editor();
        let first = SessionId::new();
        let second = SessionId::new();

        editor.handle(&first, EditorEvent::AddNode).unwrap();
        assert!(editor.payload(&second).unwrap().graph.is_empty());
    }

    #[test]
    fn test_crossover_form_fields() {
        let mut editor = editor();
        let session = SessionId::new();

        editor
            .handle(&session, EditorEvent::SetTicker(Some("AAPL".to_string())))
            .unwrap();
        editor
            .handle(&session, EditorEvent::SetSentiment(Some(Sentiment::Bearish)))
            .unwrap();
        let payload = editor
            .handle(
                &session,
                EditorEvent::SetIndicator {
                    slot: IndicatorSlot::Unresponsive,
                    getter: Some(IndicatorGetter {
                        name: "MovingAverage".to_string(),
                        config: json!({"window": 50}),
                    }),
                },
            )
            .unwrap();
        assert_eq!(payload.ticker(), Some("AAPL"));
        assert_eq!(payload.sentiment, Some(Sentiment::Bearish));
        assert_eq!(payload.unresponsive.as_ref().map(|g| g.name.as_str()), Some("MovingAverage"));
        assert!(payload.graph.is_empty());

        // Neutral is not a crossover sentiment.
        let after = editor
            .handle(&session, EditorEvent::SetSentiment(Some(Sentiment::Neutral)))
            .unwrap();
        assert_eq!(after, payload);
    }
}
