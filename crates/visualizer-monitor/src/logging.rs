//! Logging setup.

use std::str::FromStr;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose events are shown at the configured level. Everything else,
/// including the HTTP stack, stays at `warn`.
const CRATES: [&str; 6] = [
    "market_visualizer",
    "visualizer_core",
    "visualizer_graph",
    "visualizer_engine",
    "visualizer_signals",
    "visualizer_config",
];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// Filter directive enabling `level` for this workspace's crates.
pub fn filter_directive(level: &str) -> String {
    let mut directive = String::from("warn");
    for krate in CRATES {
        directive.push_str(&format!(",{}={}", krate, level));
    }
    directive
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
///
/// Fails if a subscriber is already installed.
pub fn setup_logging(level: &str, format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let directive = filter_directive("debug");
        assert!(directive.starts_with("warn,"));
        assert!(directive.contains("visualizer_graph=debug"));
        assert!(directive.contains("market_visualizer=debug"));
    }

    #[test]
    fn test_log_format() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_second_install_fails() {
        let _ = setup_logging("info", LogFormat::Pretty);
        assert!(setup_logging("info", LogFormat::Json).is_err());
    }
}
