//! List signal detectors command.

use anyhow::{Context as _, Result};
use visualizer_core::EngineId;

use crate::cli::{Context, EngineArgs};

pub async fn run(args: EngineArgs, ctx: &Context) -> Result<()> {
    let engine = EngineId::new(args.engine);
    let detectors = ctx
        .engine
        .signal_detectors(&engine)
        .await
        .with_context(|| format!("Failed to list detectors of engine {}", engine))?;

    println!("{}: Signal Detectors of {}", ctx.config.app.title, engine);
    println!("═══════════════════════════════════════════════════════════");

    if detectors.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for record in &detectors {
        let id = record
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<24} {:<12} id {}", record.name, record.static_name, id);
    }
    Ok(())
}
