//! Signal detector graph builder CLI.

mod cli;

use anyhow::{Context as _, Result};
use clap::Parser;
use cli::{commands, Cli, Commands, Context};
use visualizer_config::load_config;
use visualizer_monitor::{setup_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_config(&cli.config);

    // Command line flags win over the configuration file.
    let level = match (&cli.log_level, &loaded) {
        (Some(level), _) => level.as_str().to_string(),
        (None, Ok(config)) => config.logging.level.clone(),
        (None, Err(_)) => "info".to_string(),
    };
    let format = match &loaded {
        _ if cli.json_logs => LogFormat::Json,
        Ok(config) => config.logging.format.parse().unwrap_or_default(),
        Err(_) => LogFormat::Pretty,
    };
    if let Err(e) = setup_logging(&level, format) {
        eprintln!("Logging unavailable: {}", e);
    }

    if let Commands::ValidateConfig = cli.command {
        return commands::validate::run(&cli.config, loaded);
    }

    let config =
        loaded.with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let ctx = Context::connect(config)?;

    match cli.command {
        Commands::Create(args) => commands::create::run(args, &ctx).await,
        Commands::Detectors(args) => commands::detectors::run(args, &ctx).await,
        Commands::Supported => commands::supported::run(&ctx).await,
        Commands::Activate(args) => commands::activate::run(args, &ctx).await,
        Commands::Edit(args) => commands::edit::run(args, &ctx).await,
        Commands::Build(args) => commands::build::run(args, &ctx).await,
        Commands::Remove(args) => commands::remove::run(args, &ctx).await,
        Commands::ValidateConfig => Ok(()),
    }
}
