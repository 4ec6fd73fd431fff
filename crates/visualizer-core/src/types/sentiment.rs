//! Signal sentiment and phase definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display color used when no sentiment applies.
pub const NEUTRAL_COLOR: &str = "grey";

/// Classification of a market signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    /// Display color for this sentiment.
    pub fn color(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "green",
            Sentiment::Bearish => "red",
            Sentiment::Neutral => NEUTRAL_COLOR,
        }
    }

    /// Sentiments a graph node can be annotated with.
    pub fn directional() -> &'static [Sentiment] {
        &[Sentiment::Bullish, Sentiment::Bearish]
    }

    /// Capitalized label, e.g. `Bullish`.
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "Bullish",
            Sentiment::Bearish => "Bearish",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Bullish => "BULLISH",
            Sentiment::Bearish => "BEARISH",
            Sentiment::Neutral => "NEUTRAL",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BULLISH" => Ok(Sentiment::Bullish),
            "BEARISH" => Ok(Sentiment::Bearish),
            "NEUTRAL" => Ok(Sentiment::Neutral),
            _ => Err(format!("Unknown sentiment: {}", s)),
        }
    }
}

/// Whether a signal fires when a state is entered or exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Enter,
    Exit,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[Phase::Enter, Phase::Exit]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Enter => "enter",
            Phase::Exit => "exit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Enter => "ENTER",
            Phase::Exit => "EXIT",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ENTER" => Ok(Phase::Enter),
            "EXIT" => Ok(Phase::Exit),
            _ => Err(format!("Unknown phase: {}", s)),
        }
    }
}

/// A `(sentiment, phase)` pair attached to a signal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalAnnotation {
    pub sentiment: Sentiment,
    pub phase: Phase,
}

impl SignalAnnotation {
    pub fn new(sentiment: Sentiment, phase: Phase) -> Self {
        Self { sentiment, phase }
    }
}

impl fmt::Display for SignalAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sentiment.label(), self.phase.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_colors() {
        assert_eq!(Sentiment::Bullish.color(), "green");
        assert_eq!(Sentiment::Bearish.color(), "red");
        assert_eq!(Sentiment::Neutral.color(), NEUTRAL_COLOR);
    }

    #[test]
    fn test_sentiment_parse() {
        assert_eq!("bullish".parse::<Sentiment>().unwrap(), Sentiment::Bullish);
        assert_eq!("BEARISH".parse::<Sentiment>().unwrap(), Sentiment::Bearish);
        assert!("sideways".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_serde_uses_engine_names() {
        let json = serde_json::to_string(&SignalAnnotation::new(Sentiment::Bullish, Phase::Exit))
            .unwrap();
        assert_eq!(json, r#"{"sentiment":"BULLISH","phase":"EXIT"}"#);
    }

    #[test]
    fn test_directional_excludes_neutral() {
        assert!(!Sentiment::directional().contains(&Sentiment::Neutral));
    }
}
