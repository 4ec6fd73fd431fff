//! Supported detector types command.

use anyhow::{Context as _, Result};
use visualizer_signals::{Reconciliation, INDICATORS};

use crate::cli::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    let detectors = ctx
        .engine
        .supported_signal_detectors()
        .await
        .context("Failed to list supported signal detectors")?;
    let indicators = ctx
        .engine
        .supported_indicators()
        .await
        .context("Failed to list supported indicators")?;
    let registry = ctx.registry();
    let reconciliation = registry.reconcile(&detectors);
    let indicator_gaps = Reconciliation::between(&indicators, INDICATORS);

    println!("{}", ctx.config.app.title);
    println!();
    println!("Signal Detectors");
    println!("═══════════════════════════════════════════════════════════");
    for name in &detectors {
        let marker = if registry.get(name).is_some() { "*" } else { " " };
        println!("  {} {}", marker, name);
    }
    println!();
    println!("Indicators");
    println!("═══════════════════════════════════════════════════════════");
    for name in &indicators {
        let marker = if INDICATORS.contains(&name.as_str()) { "*" } else { " " };
        println!("  {} {}", marker, name);
    }
    println!();
    println!("* can be added from this tool");

    if !reconciliation.unsupported.is_empty() {
        println!(
            "Not supported by the engine: {}",
            reconciliation.unsupported.join(", ")
        );
    }
    if !indicator_gaps.unsupported.is_empty() {
        println!(
            "Indicators not supported by the engine: {}",
            indicator_gaps.unsupported.join(", ")
        );
    }
    Ok(())
}
