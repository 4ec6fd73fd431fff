//! Graph-to-builder compiler.

use std::collections::{HashMap, HashSet};
use tracing::debug;
use visualizer_core::{
    CompileError, Detector, DetectorBuilder, DetectorDefinition, DetectorId, DetectorRecord,
    DetectorSpec, GraphElement,
};

/// Resolves detector ids referenced by edges.
pub trait DetectorLookup {
    fn detector(&self, id: DetectorId) -> Option<&Detector>;
}

/// Detectors configured on an engine, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DetectorCatalog {
    detectors: HashMap<DetectorId, Detector>,
}

impl DetectorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index engine records. Records without an id are skipped.
    pub fn from_records(records: impl IntoIterator<Item = DetectorRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            let name = record.name.clone();
            match Detector::from_record(record) {
                Some(detector) => catalog.insert(detector),
                None => debug!(detector = %name, "Skipping detector without id"),
            }
        }
        catalog
    }

    pub fn insert(&mut self, detector: Detector) {
        self.detectors.insert(detector.id, detector);
    }

    pub fn ids(&self) -> impl Iterator<Item = DetectorId> + '_ {
        self.detectors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl DetectorLookup for DetectorCatalog {
    fn detector(&self, id: DetectorId) -> Option<&Detector> {
        self.detectors.get(&id)
    }
}

/// Translates graph elements into builder calls.
///
/// Nodes are processed before edges so every transition references declared
/// states. Each detector is registered once, before its first transition.
pub struct GraphCompiler<'a, L: DetectorLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: DetectorLookup + ?Sized> GraphCompiler<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Compile `elements` into a graph detector spec.
    ///
    /// `make_builder` receives the validated detector name. Refused when the
    /// name is blank, no node is initial, an edge references a detector the
    /// lookup does not know, or the builder rejects a call.
    pub fn compile<B, F>(
        &self,
        elements: &[GraphElement],
        name: Option<&str>,
        make_builder: F,
    ) -> Result<DetectorSpec, CompileError>
    where
        B: DetectorBuilder,
        F: FnOnce(&str) -> B,
    {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(CompileError::MissingName)?;
        let mut builder = make_builder(name);

        let mut has_initial = false;
        for node in elements.iter().filter_map(GraphElement::as_node) {
            builder.add_state(node.id())?;
            if node.is_initial() {
                builder.set_initial_state(node.id())?;
                has_initial = true;
            }
            for annotation in node.annotations().iter() {
                builder.add_signal_description(node.id(), annotation.sentiment, annotation.phase)?;
            }
        }
        if !has_initial {
            return Err(CompileError::MissingInitialState);
        }

        let mut registered = HashSet::new();
        for edge in elements.iter().filter_map(GraphElement::as_edge) {
            let Some(detector_id) = edge.detector_id() else {
                continue;
            };
            if !registered.contains(&detector_id) {
                let detector = self
                    .lookup
                    .detector(detector_id)
                    .ok_or(CompileError::UnknownDetector(detector_id))?;
                builder.add_detector(detector.clone())?;
                registered.insert(detector_id);
            }
            builder.add_transition(edge.source, edge.target, detector_id)?;
        }

        let definition = builder.build()?;
        let config = definition.to_config()?;
        debug!(
            detector = definition.id(),
            name = definition.name(),
            detectors = registered.len(),
            "Graph compiled"
        );
        Ok(DetectorSpec::graph(config))
    }
}
