//! Add configured detector command.

use anyhow::{bail, Result};
use visualizer_core::EngineId;

use super::payload::read_payload;
use crate::cli::{BuildArgs, Context};

pub async fn run(args: BuildArgs, ctx: &Context) -> Result<()> {
    let mut payload = read_payload(&args.payload)?;
    if args.name.is_some() {
        payload.name = args.name;
    }

    let registry = ctx.registry();
    let Some(handler) = registry.get(&args.detector_type) else {
        bail!(
            "Unknown detector type {}; available: {}",
            args.detector_type,
            registry.names().join(", ")
        );
    };

    let engine = EngineId::new(args.engine);
    match handler.create(Some(&engine), &mut payload).await {
        Some(new_engine) if new_engine != engine => {
            println!("{}", new_engine);
            Ok(())
        }
        _ => bail!(
            "{} detector was not added; see the log for the reason",
            args.detector_type
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use visualizer_config::AppConfig;
    use visualizer_core::{
        CreateEngineRequest, Detector, DetectorSpec, EngineApi, IdGenerator, Phase, Sentiment,
        SessionId, SignalDataPayload,
    };
    use visualizer_engine::InMemoryEngine;
    use visualizer_graph::DetectorGraph;

    fn write_payload(payload: &SignalDataPayload) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("graph-{}.json", SessionId::new()));
        std::fs::write(&path, serde_json::to_string(payload).unwrap()).unwrap();
        path
    }

    fn payload() -> SignalDataPayload {
        let mut ids = IdGenerator::seeded(100, 2);
        let mut graph = DetectorGraph::new();
        let n1 = graph.add_node(&mut ids).unwrap();
        let n2 = graph.add_node(&mut ids).unwrap();
        graph.set_initial(n1).unwrap();
        graph.annotate_node(n2, Sentiment::Bearish, Phase::Enter).unwrap();
        let detector = Detector {
            id: 5,
            name: "Monthly".to_string(),
            static_name: "Monthly".to_string(),
            config: serde_json::json!(5),
        };
        graph.attach_detector(&[n1, n2], &[], &detector, &mut ids).unwrap();
        SignalDataPayload::with_graph(graph.into_elements(), None)
    }

    #[tokio::test]
    async fn test_build_from_file() {
        let engine = Arc::new(InMemoryEngine::new());
        let request = CreateEngineRequest::new(
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            &["AAPL".to_string()],
            vec![DetectorSpec::new("Monthly", "5")],
        );
        let id = engine.create_engine(&request).await.unwrap();
        let ctx = Context::with_engine(AppConfig::default(), engine.clone());
        let path = write_payload(&payload());

        let unnamed = BuildArgs {
            engine: id.to_string(),
            detector_type: "Graph".to_string(),
            payload: path.clone(),
            name: None,
        };
        assert!(run(unnamed, &ctx).await.is_err());

        let named = BuildArgs {
            engine: id.to_string(),
            detector_type: "Graph".to_string(),
            payload: path.clone(),
            name: Some("reversal".to_string()),
        };
        run(named, &ctx).await.unwrap();
        std::fs::remove_file(path).unwrap();

        // The given engine id is unchanged; only its successor has the graph.
        assert_eq!(engine.signal_detectors(&id).await.unwrap().len(), 1);
        assert_eq!(engine.snapshot_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let ctx = Context::with_engine(AppConfig::default(), Arc::new(InMemoryEngine::new()));
        let args = BuildArgs {
            engine: "e".to_string(),
            detector_type: "Graph".to_string(),
            payload: "no-such-graph.json".into(),
            name: None,
        };
        assert!(run(args, &ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_build_ticker_detector() {
        let engine = Arc::new(InMemoryEngine::new());
        let request = CreateEngineRequest::new(
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            &["AAPL".to_string()],
            vec![],
        );
        let id = engine.create_engine(&request).await.unwrap();
        let ctx = Context::with_engine(AppConfig::default(), engine.clone());
        let mut ticker = SignalDataPayload::new();
        ticker.ticker = Some("AAPL".to_string());
        let path = write_payload(&ticker);

        let unknown = BuildArgs {
            engine: id.to_string(),
            detector_type: "Weekly".to_string(),
            payload: path.clone(),
            name: None,
        };
        assert!(run(unknown, &ctx).await.is_err());

        let args = BuildArgs {
            engine: id.to_string(),
            detector_type: "Death Cross".to_string(),
            payload: path.clone(),
            name: None,
        };
        run(args, &ctx).await.unwrap();
        std::fs::remove_file(path).unwrap();
        assert_eq!(engine.snapshot_count(), 2);
    }
}
