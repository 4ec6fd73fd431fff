//! Edit detector payload command.

use anyhow::{Context as _, Result};
use serde_json::Value;
use visualizer_core::{
    Detector, ElementId, EngineId, IdGenerator, IndicatorGetter, IndicatorSlot, SessionId,
    SessionStore, SignalDataPayload,
};
use visualizer_graph::{DetectorGraph, EditorEvent, GraphEditor, MemorySessionStore};

use super::payload::{read_payload_or_default, write_payload};
use crate::cli::{Context, EditAction, EditArgs};

/// An edit resolved from the command line.
enum Edit {
    Event(EditorEvent),
    /// Resolved through the editor's node-type menu.
    NodeType { label: String, nodes: Vec<ElementId> },
}

async fn resolve(action: EditAction, ctx: &Context) -> Result<Edit> {
    let event = match action {
        EditAction::AddNode => EditorEvent::AddNode,
        EditAction::Remove(selection) => EditorEvent::Remove {
            nodes: selection.nodes,
            edges: selection.edges,
        },
        EditAction::Attach {
            engine,
            detector,
            selection,
        } => {
            let engine = EngineId::new(engine);
            let record = ctx.detector_named(&engine, &detector).await?;
            let detector = Detector::from_record(record)
                .with_context(|| format!("Detector {} has no id", detector))?;
            EditorEvent::AttachDetector {
                nodes: selection.nodes,
                edges: selection.edges,
                detector,
            }
        }
        EditAction::NodeType { label, nodes } => return Ok(Edit::NodeType { label, nodes }),
        EditAction::Name { name } => EditorEvent::SetName(name),
        EditAction::Ticker { ticker } => EditorEvent::SetTicker(ticker),
        EditAction::Sentiment { sentiment } => EditorEvent::SetSentiment(sentiment),
        EditAction::Indicator { slot, name, config } => {
            let config = match config {
                Some(raw) => serde_json::from_str(&raw).context("Invalid indicator config")?,
                None => Value::Null,
            };
            EditorEvent::SetIndicator {
                slot,
                getter: name.map(|name| IndicatorGetter { name, config }),
            }
        }
        EditAction::Reset => EditorEvent::Reset,
    };
    Ok(Edit::Event(event))
}

fn print_payload(payload: &SignalDataPayload) -> Result<()> {
    let graph = DetectorGraph::from_elements(payload.graph.clone())
        .context("Payload holds an invalid graph")?;
    for node in graph.nodes() {
        println!("  node {:<10} {:?}", node.id(), node.role());
    }
    for edge in graph.edges() {
        let detector = edge
            .detector
            .as_ref()
            .and_then(|d| d.label.lines().next())
            .unwrap_or("-");
        println!("  edge {:<10} {} -> {} {}", edge.id, edge.source, edge.target, detector);
    }
    if let Some(name) = payload.detector_name() {
        println!("  name   {}", name);
    }
    if let Some(ticker) = payload.ticker() {
        println!("  ticker {}", ticker);
    }
    if let Some(sentiment) = payload.sentiment {
        println!("  sentiment {}", sentiment.label());
    }
    for slot in [IndicatorSlot::Responsive, IndicatorSlot::Unresponsive] {
        if let Some(getter) = payload.indicator(slot) {
            println!("  {:?} {} {}", slot, getter.name, getter.config);
        }
    }
    Ok(())
}

pub async fn run(args: EditArgs, ctx: &Context) -> Result<()> {
    let before = read_payload_or_default(&args.payload)?;

    let store = MemorySessionStore::new(ctx.config.session.max_sessions);
    let session = SessionId::new();
    store.store(&session, before.clone())?;
    let mut editor = GraphEditor::new(store, IdGenerator::new(ctx.config.ids.max_id_generator));

    let after = match resolve(args.action, ctx).await? {
        Edit::Event(event) => editor.handle(&session, event)?,
        Edit::NodeType { label, nodes } => editor.select_node_type(&session, &label, nodes)?,
    };

    if after == before {
        println!("{} unchanged", args.payload.display());
    } else {
        write_payload(&args.payload, &after)?;
        println!("{} updated", args.payload.display());
    }
    print_payload(&after)
}
