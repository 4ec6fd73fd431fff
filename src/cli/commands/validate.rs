//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use visualizer_config::{AppConfig, ConfigError};

pub fn run(config_path: &Path, loaded: Result<AppConfig, ConfigError>) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match loaded {
        Ok(config) => {
            println!("Configuration is valid!");
            if !config_path.exists() {
                println!("(file not found, defaults and environment only)");
            }
            println!();
            println!("Title: {}", config.app.title);
            println!("Log level: {}", config.logging.level);
            println!("Log format: {}", config.logging.format);
            println!(
                "Engine: {}:{} (timeout {}s, {} connect retries)",
                config.engine.api_url,
                config.engine.api_port,
                config.engine.timeout_secs,
                config.engine.max_connect_retries
            );
            println!("Detector id range: 0..{}", config.ids.max_id_generator);
            println!("Max sessions: {}", config.session.max_sessions);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
