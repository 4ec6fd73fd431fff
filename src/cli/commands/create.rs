//! Create engine command.

use anyhow::{Context as _, Result};
use tracing::info;
use visualizer_core::CreateEngineRequest;

use crate::cli::{Context, CreateArgs};

pub async fn run(args: CreateArgs, ctx: &Context) -> Result<()> {
    let request = CreateEngineRequest::new(args.start, &args.tickers, Vec::new());
    let engine = ctx
        .engine
        .create_engine(&request)
        .await
        .context("Failed to create engine")?;

    info!(%engine, tickers = ?args.tickers, "Engine created");
    println!("{}", engine);
    Ok(())
}
