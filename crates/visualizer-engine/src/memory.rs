//! In-memory engine for simulation and tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;
use visualizer_core::{
    config_id, CreateEngineRequest, DetectorId, DetectorRecord, DetectorSpec, EngineApi,
    EngineError, EngineId,
};

/// Engine state as seen through one engine id.
#[derive(Debug, Clone)]
struct Snapshot {
    start_date: NaiveDate,
    date: NaiveDate,
    tickers: Vec<String>,
    detectors: Vec<DetectorRecord>,
}

/// Default bound on stored snapshots.
pub const DEFAULT_MAX_SNAPSHOTS: usize = 10_000;

#[derive(Default)]
struct Snapshots {
    by_id: HashMap<EngineId, Snapshot>,
    order: VecDeque<EngineId>,
}

/// Engine keeping one immutable snapshot per engine id.
///
/// Every mutation stores a modified copy under a freshly minted id, so old
/// ids keep resolving to the state they were issued for. At most
/// `max_snapshots` are kept; the oldest id stops resolving first.
pub struct InMemoryEngine {
    snapshots: Mutex<Snapshots>,
    max_snapshots: usize,
    supported_detectors: Vec<String>,
    supported_indicators: Vec<String>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(Snapshots::default()),
            max_snapshots: DEFAULT_MAX_SNAPSHOTS,
            supported_detectors: [
                "Graph",
                "Monthly",
                "BiMonthly",
                "Golden Cross",
                "Death Cross",
                "Crossover",
            ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            supported_indicators: ["Identity", "MovingAverage", "ExponentialMovingAverage"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Restrict the detector types the engine accepts.
    pub fn with_supported_detectors(mut self, names: &[&str]) -> Self {
        self.supported_detectors = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Bound the number of stored snapshots. At least one is kept.
    pub fn with_max_snapshots(mut self, max_snapshots: usize) -> Self {
        self.max_snapshots = max_snapshots.max(1);
        self
    }

    /// Number of engine ids currently resolvable.
    pub fn snapshot_count(&self) -> usize {
        self.lock().map(|s| s.by_id.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshots>, EngineError> {
        self.snapshots
            .lock()
            .map_err(|_| EngineError::Internal("engine lock poisoned".into()))
    }

    fn snapshot(&self, engine: &EngineId) -> Result<Snapshot, EngineError> {
        self.lock()?
            .by_id
            .get(engine)
            .cloned()
            .ok_or_else(|| EngineError::UnknownEngine(engine.to_string()))
    }

    fn insert(&self, snapshot: Snapshot) -> Result<EngineId, EngineError> {
        let id = EngineId::new(Uuid::new_v4().simple().to_string());
        let mut snapshots = self.lock()?;
        snapshots.by_id.insert(id.clone(), snapshot);
        snapshots.order.push_back(id.clone());
        while snapshots.order.len() > self.max_snapshots {
            if let Some(oldest) = snapshots.order.pop_front() {
                snapshots.by_id.remove(&oldest);
                debug!(engine = %oldest, "Engine snapshot evicted");
            }
        }
        Ok(id)
    }

    /// Apply `change` to a copy of the engine state and issue a new id for it.
    fn mutate<F>(&self, engine: &EngineId, change: F) -> Result<EngineId, EngineError>
    where
        F: FnOnce(&mut Snapshot) -> Result<(), EngineError>,
    {
        let mut snapshot = self.snapshot(engine)?;
        change(&mut snapshot)?;
        let id = self.insert(snapshot)?;
        debug!(from = %engine, to = %id, "Engine mutated");
        Ok(id)
    }

    fn record(&self, spec: &DetectorSpec) -> Result<DetectorRecord, EngineError> {
        if !self.supported_detectors.contains(&spec.static_name) {
            return Err(EngineError::Rejected(format!(
                "Unsupported detector type: {}",
                spec.static_name
            )));
        }
        let config = spec.config_value();
        let name = config
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| spec.static_name.clone());
        Ok(DetectorRecord {
            name,
            static_name: spec.static_name.clone(),
            config,
        })
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn add_detector(snapshot: &mut Snapshot, record: DetectorRecord) -> Result<(), EngineError> {
    let id = config_id(&record.config)
        .ok_or_else(|| EngineError::Rejected(format!("Detector {} has no id", record.name)))?;
    if snapshot.detectors.iter().any(|d| d.id() == Some(id)) {
        return Err(EngineError::Rejected(format!("Duplicate detector id: {}", id)));
    }
    snapshot.detectors.push(record);
    Ok(())
}

#[async_trait]
impl EngineApi for InMemoryEngine {
    async fn create_engine(&self, request: &CreateEngineRequest) -> Result<EngineId, EngineError> {
        let mut snapshot = Snapshot {
            start_date: request.stock_market.start_date,
            date: request.stock_market.start_date,
            tickers: request
                .stock_market
                .tickers
                .iter()
                .map(|t| t.symbol.clone())
                .collect(),
            detectors: Vec::new(),
        };
        for spec in &request.signal_detectors {
            let record = self.record(spec)?;
            add_detector(&mut snapshot, record)?;
        }
        self.insert(snapshot)
    }

    async fn start_date(&self, engine: &EngineId) -> Result<NaiveDate, EngineError> {
        Ok(self.snapshot(engine)?.start_date)
    }

    async fn date(&self, engine: &EngineId) -> Result<NaiveDate, EngineError> {
        Ok(self.snapshot(engine)?.date)
    }

    async fn update(&self, engine: &EngineId, date: NaiveDate) -> Result<EngineId, EngineError> {
        self.mutate(engine, |s| {
            if date < s.start_date {
                return Err(EngineError::Rejected(format!(
                    "{} is before the start date {}",
                    date, s.start_date
                )));
            }
            s.date = date;
            Ok(())
        })
    }

    async fn tickers(&self, engine: &EngineId) -> Result<Vec<String>, EngineError> {
        Ok(self.snapshot(engine)?.tickers)
    }

    async fn ticker_ohlc(
        &self,
        engine: &EngineId,
        ticker: &str,
    ) -> Result<Option<Value>, EngineError> {
        let snapshot = self.snapshot(engine)?;
        if !snapshot.tickers.iter().any(|t| t == ticker) {
            return Ok(None);
        }
        Ok(Some(json!({ "symbol": ticker, "history": [] })))
    }

    async fn add_ticker(&self, engine: &EngineId, ticker: &str) -> Result<EngineId, EngineError> {
        self.mutate(engine, |s| {
            if s.tickers.iter().any(|t| t == ticker) {
                return Err(EngineError::Rejected(format!("Ticker already added: {}", ticker)));
            }
            s.tickers.push(ticker.to_string());
            Ok(())
        })
    }

    async fn remove_ticker(
        &self,
        engine: &EngineId,
        ticker: &str,
    ) -> Result<EngineId, EngineError> {
        self.mutate(engine, |s| {
            let before = s.tickers.len();
            s.tickers.retain(|t| t != ticker);
            if s.tickers.len() == before {
                return Err(EngineError::Rejected(format!("Unknown ticker: {}", ticker)));
            }
            Ok(())
        })
    }

    async fn signal_detectors(
        &self,
        engine: &EngineId,
    ) -> Result<Vec<DetectorRecord>, EngineError> {
        Ok(self.snapshot(engine)?.detectors)
    }

    async fn add_signal_detector(
        &self,
        engine: &EngineId,
        spec: &DetectorSpec,
    ) -> Result<EngineId, EngineError> {
        let record = self.record(spec)?;
        self.mutate(engine, |s| add_detector(s, record))
    }

    async fn remove_signal_detector(
        &self,
        engine: &EngineId,
        detector: DetectorId,
    ) -> Result<EngineId, EngineError> {
        self.mutate(engine, |s| {
            let before = s.detectors.len();
            s.detectors.retain(|d| d.id() != Some(detector));
            if s.detectors.len() == before {
                return Err(EngineError::Rejected(format!("Unknown detector: {}", detector)));
            }
            Ok(())
        })
    }

    async fn signals(&self, engine: &EngineId) -> Result<Value, EngineError> {
        self.snapshot(engine)?;
        Ok(json!([]))
    }

    async fn supported_signal_detectors(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.supported_detectors.clone())
    }

    async fn supported_indicators(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.supported_indicators.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
