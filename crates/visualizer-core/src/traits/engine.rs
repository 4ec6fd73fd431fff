//! Remote engine API trait.

use crate::error::EngineError;
use crate::types::{DetectorId, DetectorRecord, DetectorSpec, EngineId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a create-engine request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEngineRequest {
    pub stock_market: StockMarketConfig,
    pub signal_detectors: Vec<DetectorSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMarketConfig {
    pub start_date: NaiveDate,
    pub tickers: Vec<TickerConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {
    pub symbol: String,
}

impl CreateEngineRequest {
    pub fn new(start_date: NaiveDate, tickers: &[String], signal_detectors: Vec<DetectorSpec>) -> Self {
        Self {
            stock_market: StockMarketConfig {
                start_date,
                tickers: tickers
                    .iter()
                    .map(|symbol| TickerConfig { symbol: symbol.clone() })
                    .collect(),
            },
            signal_detectors,
        }
    }
}

/// Trait for stock market engine backends.
///
/// Every mutating operation yields a new engine identity; the identity passed
/// in keeps referring to the state before the mutation.
#[async_trait]
pub trait EngineApi: Send + Sync {
    /// Create an engine.
    async fn create_engine(&self, request: &CreateEngineRequest) -> Result<EngineId, EngineError>;

    /// First simulated date.
    async fn start_date(&self, engine: &EngineId) -> Result<NaiveDate, EngineError>;

    /// Current simulated date.
    async fn date(&self, engine: &EngineId) -> Result<NaiveDate, EngineError>;

    /// Advance the engine to `date`.
    async fn update(&self, engine: &EngineId, date: NaiveDate) -> Result<EngineId, EngineError>;

    async fn tickers(&self, engine: &EngineId) -> Result<Vec<String>, EngineError>;

    /// OHLC history for a ticker, `None` when the engine has no data for it.
    async fn ticker_ohlc(&self, engine: &EngineId, ticker: &str)
        -> Result<Option<Value>, EngineError>;

    async fn add_ticker(&self, engine: &EngineId, ticker: &str) -> Result<EngineId, EngineError>;

    async fn remove_ticker(&self, engine: &EngineId, ticker: &str)
        -> Result<EngineId, EngineError>;

    /// Detectors currently configured on the engine.
    async fn signal_detectors(&self, engine: &EngineId)
        -> Result<Vec<DetectorRecord>, EngineError>;

    async fn add_signal_detector(
        &self,
        engine: &EngineId,
        spec: &DetectorSpec,
    ) -> Result<EngineId, EngineError>;

    async fn remove_signal_detector(
        &self,
        engine: &EngineId,
        detector: DetectorId,
    ) -> Result<EngineId, EngineError>;

    /// Signals emitted so far.
    async fn signals(&self, engine: &EngineId) -> Result<Value, EngineError>;

    /// Detector type names the engine supports.
    async fn supported_signal_detectors(&self) -> Result<Vec<String>, EngineError>;

    /// Indicator names the engine supports.
    async fn supported_indicators(&self) -> Result<Vec<String>, EngineError>;

    /// Ids of the detectors configured on the engine.
    async fn detector_ids(&self, engine: &EngineId) -> Result<Vec<DetectorId>, EngineError> {
        let detectors = self.signal_detectors(engine).await?;
        Ok(detectors.iter().filter_map(DetectorRecord::id).collect())
    }

    /// Backend name for logging.
    fn name(&self) -> &str;
}
