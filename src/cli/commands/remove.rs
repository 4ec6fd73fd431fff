//! Remove signal detector command.

use anyhow::{bail, Result};
use visualizer_core::EngineId;

use crate::cli::{Context, RemoveArgs};

pub async fn run(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let engine = EngineId::new(args.engine);
    let record = ctx.detector_named(&engine, &args.detector).await?;

    match ctx.registry().remove_detector(Some(&engine), &record).await {
        Some(new_engine) if new_engine != engine => {
            println!("{}", new_engine);
            Ok(())
        }
        _ => bail!("Detector {} was not removed; see the log for the reason", args.detector),
    }
}
