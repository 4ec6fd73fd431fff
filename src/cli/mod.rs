//! CLI definitions.

pub mod commands;
mod context;

pub use context::Context;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use visualizer_core::{ElementId, IndicatorSlot, Sentiment, GRAPH_DETECTOR_NAME};

#[derive(Parser)]
#[command(name = "market-visualizer")]
#[command(author, version, about = "Signal detector graph builder for the stock market engine")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level, overrides the configuration file
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an engine
    Create(CreateArgs),
    /// List the signal detectors of an engine
    Detectors(EngineArgs),
    /// List detector types and indicators supported by the engine
    Supported,
    /// Select a detector type; config-free detectors are added immediately
    Activate(ActivateArgs),
    /// Edit a detector payload file
    Edit(EditArgs),
    /// Add the detector described by a payload file to an engine
    Build(BuildArgs),
    /// Remove a signal detector from an engine
    Remove(RemoveArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// First simulated date (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Tickers to load (comma-separated)
    #[arg(short = 'T', long, value_delimiter = ',')]
    pub tickers: Vec<String>,
}

#[derive(clap::Args)]
pub struct EngineArgs {
    /// Engine id
    #[arg(short, long)]
    pub engine: String,
}

#[derive(clap::Args)]
pub struct ActivateArgs {
    /// Engine id
    #[arg(short, long)]
    pub engine: String,

    /// Detector type, e.g. Monthly
    #[arg(short = 't', long = "type")]
    pub detector_type: String,
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Engine id
    #[arg(short, long)]
    pub engine: String,

    /// Detector type, e.g. Crossover
    #[arg(short = 't', long = "type", default_value = GRAPH_DETECTOR_NAME)]
    pub detector_type: String,

    /// Payload file written by `edit`
    #[arg(short, long, alias = "graph")]
    pub payload: PathBuf,

    /// Detector name, overrides the one in the payload
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Payload file, created when missing
    #[arg(short, long)]
    pub payload: PathBuf,

    #[command(subcommand)]
    pub action: EditAction,
}

/// Selected graph elements.
#[derive(clap::Args, Debug, Default)]
pub struct SelectionArgs {
    /// Node ids (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub nodes: Vec<ElementId>,

    /// Edge ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub edges: Vec<ElementId>,
}

#[derive(Subcommand, Debug)]
pub enum EditAction {
    /// Add an unconnected node
    AddNode,
    /// Remove the selected nodes and edges
    Remove(SelectionArgs),
    /// Connect the selected nodes through a detector of an engine
    Attach {
        /// Engine id
        #[arg(short, long)]
        engine: String,

        /// Name of the detector guarding the new edges
        #[arg(short, long)]
        detector: String,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Set the type of the selected nodes, e.g. "Bullish enter"
    NodeType {
        label: String,

        /// Node ids (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        nodes: Vec<ElementId>,
    },
    /// Set the detector name; clears it when omitted
    Name { name: Option<String> },
    /// Set the ticker; clears it when omitted
    Ticker { ticker: Option<String> },
    /// Set the crossover sentiment (bullish or bearish)
    Sentiment { sentiment: Option<Sentiment> },
    /// Set a crossover indicator; clears the side when no type is given
    Indicator {
        /// responsive or unresponsive
        slot: IndicatorSlot,

        /// Indicator type, e.g. MovingAverage
        name: Option<String>,

        /// Indicator arguments as JSON
        #[arg(long)]
        config: Option<String>,
    },
    /// Clear the payload
    Reset,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Engine id
    #[arg(short, long)]
    pub engine: String,

    /// Name of the detector to remove
    #[arg(short, long)]
    pub detector: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from([
            "market-visualizer",
            "--json-logs",
            "build",
            "--engine",
            "e1",
            "--graph",
            "graph.json",
            "--name",
            "trend",
        ])
        .unwrap();

        assert!(cli.json_logs);
        assert_eq!(cli.log_level, None);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.engine, "e1");
                assert_eq!(args.detector_type, "Graph");
                assert_eq!(args.payload, PathBuf::from("graph.json"));
                assert_eq!(args.name.as_deref(), Some("trend"));
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "market-visualizer",
            "-l",
            "debug",
            "create",
            "--start",
            "2020-01-02",
            "-T",
            "AAPL,MSFT",
        ])
        .unwrap();

        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.start, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
                assert_eq!(args.tickers, vec!["AAPL", "MSFT"]);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_parse_edit_node_type() {
        let cli = Cli::try_parse_from([
            "market-visualizer",
            "edit",
            "-p",
            "session.json",
            "node-type",
            "Bullish enter",
            "--nodes",
            "4,9",
        ])
        .unwrap();

        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.payload, PathBuf::from("session.json"));
                match args.action {
                    EditAction::NodeType { label, nodes } => {
                        assert_eq!(label, "Bullish enter");
                        assert_eq!(nodes, vec![4, 9]);
                    }
                    other => panic!("expected node-type, got {:?}", other),
                }
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_parse_edit_attach_and_sentiment() {
        let cli = Cli::try_parse_from([
            "market-visualizer",
            "edit",
            "--payload",
            "s.json",
            "attach",
            "-e",
            "e1",
            "-d",
            "Monthly",
            "-n",
            "1,2",
        ])
        .unwrap();
        let Commands::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        match args.action {
            EditAction::Attach {
                engine,
                detector,
                selection,
            } => {
                assert_eq!(engine, "e1");
                assert_eq!(detector, "Monthly");
                assert_eq!(selection.nodes, vec![1, 2]);
                assert!(selection.edges.is_empty());
            }
            other => panic!("expected attach, got {:?}", other),
        }

        let cli =
            Cli::try_parse_from(["market-visualizer", "edit", "-p", "s.json", "sentiment", "bearish"])
                .unwrap();
        let Commands::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        assert!(matches!(
            args.action,
            EditAction::Sentiment {
                sentiment: Some(Sentiment::Bearish)
            }
        ));
        let bad = ["market-visualizer", "edit", "-p", "s.json", "sentiment", "up"];
        assert!(Cli::try_parse_from(bad).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        assert!(Cli::try_parse_from(["market-visualizer", "create", "--start", "yesterday"]).is_err());
    }
}
