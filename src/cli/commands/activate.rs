//! Activate detector type command.

use anyhow::{bail, Result};
use visualizer_core::{EngineId, SignalDataPayload};

use crate::cli::{ActivateArgs, Context};

pub async fn run(args: ActivateArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry();
    let Some(handler) = registry.get(&args.detector_type) else {
        bail!(
            "Unknown detector type {}; available: {}",
            args.detector_type,
            registry.names().join(", ")
        );
    };

    let engine = EngineId::new(args.engine);
    let mut payload = SignalDataPayload::new();
    match handler.activate(Some(&engine), &mut payload).await {
        Some(new_engine) if new_engine != engine => println!("{}", new_engine),
        _ => println!("{} unchanged", engine),
    }
    Ok(())
}
