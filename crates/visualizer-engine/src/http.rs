//! HTTP client for the remote stock market engine.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use visualizer_core::{
    CreateEngineRequest, DetectorId, DetectorRecord, DetectorSpec, EngineApi, EngineError,
    EngineId,
};

/// Longest response body echoed into an error log.
const MAX_LOGGED_BODY: usize = 500;

/// First backoff delay between connection attempts.
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Engine REST paths.
pub mod paths {
    use visualizer_core::{DetectorId, EngineId};

    pub fn create() -> String {
        "/create".to_string()
    }

    pub fn start_date(engine: &EngineId) -> String {
        format!("/getstartdate/{}", engine)
    }

    pub fn date(engine: &EngineId) -> String {
        format!("/getdate/{}", engine)
    }

    pub fn update(engine: &EngineId) -> String {
        format!("/update/{}", engine)
    }

    pub fn tickers(engine: &EngineId) -> String {
        format!("/tickers/{}", engine)
    }

    pub fn ticker_ohlc(engine: &EngineId, ticker: &str) -> String {
        format!("/ticker/{}/{}", engine, ticker)
    }

    pub fn add_ticker(engine: &EngineId, ticker: &str) -> String {
        format!("/addticker/{}/{}", engine, ticker)
    }

    pub fn remove_ticker(engine: &EngineId, ticker: &str) -> String {
        format!("/removeticker/{}/{}", engine, ticker)
    }

    pub fn signal_detectors(engine: &EngineId) -> String {
        format!("/signaldetectors/{}", engine)
    }

    pub fn add_signal_detector(engine: &EngineId) -> String {
        format!("/addsignaldetector/{}", engine)
    }

    pub fn remove_signal_detector(engine: &EngineId, detector: DetectorId) -> String {
        format!("/removesignaldetector/{}/{}", engine, detector)
    }

    pub fn signals(engine: &EngineId) -> String {
        format!("/signals/{}", engine)
    }

    pub fn supported_signal_detectors() -> String {
        "/getsupportedsignaldetectors".to_string()
    }

    pub fn supported_indicators() -> String {
        "/getsupportedindicators".to_string()
    }
}

/// Remote engine connection settings.
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    pub api_url: String,
    pub api_port: u16,
    pub timeout: Duration,
    pub max_connect_retries: u32,
}

impl HttpEngineConfig {
    pub fn new(api_url: impl Into<String>, api_port: u16) -> Self {
        Self {
            api_url: api_url.into(),
            api_port,
            timeout: Duration::from_secs(2),
            max_connect_retries: 5,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_connect_retries(mut self, retries: u32) -> Self {
        self.max_connect_retries = retries;
        self
    }

    /// Service root, `api_url:api_port`.
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.api_url.trim_end_matches('/'), self.api_port)
    }
}

/// Engine client over HTTP.
pub struct HttpEngine {
    config: HttpEngineConfig,
    base_url: String,
    client: Client,
}

impl HttpEngine {
    pub fn new(config: HttpEngineConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        Self::with_client(config, client)
    }

    /// Engine client reusing a preconfigured `reqwest` client.
    pub fn with_client(config: HttpEngineConfig, client: Client) -> Result<Self, EngineError> {
        if config.api_url.trim().is_empty() {
            return Err(EngineError::Configuration("api_url is empty".into()));
        }

        Ok(Self {
            base_url: config.base_url(),
            config,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request, retrying connection failures with exponential backoff.
    async fn send(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Response, EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            let mut request = self.client.request(method.clone(), &url).query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(%method, %url, attempt, "Engine request");
            match request.send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_connect() && attempt < self.config.max_connect_retries => {
                    let delay = INITIAL_BACKOFF * 2u32.saturating_pow(attempt.min(10));
                    debug!(%url, error = %e, ?delay, "Engine unreachable, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(EngineError::Connection(e.to_string())),
            }
        }
    }

    /// Send a request and decode the JSON response. 204 yields `None`; any
    /// other status than 200 is an error.
    async fn request_optional_json(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, EngineError> {
        let resp = self.send(&method, path, query, body).await?;
        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            debug!(%method, path, "Engine returned no content");
            return Ok(None);
        }
        if status != StatusCode::OK {
            let url = resp.url().to_string();
            let text = resp.text().await.unwrap_or_default();
            let body = truncate(&text, MAX_LOGGED_BODY);
            if status.as_u16() >= 400 {
                warn!(%method, %url, status = status.as_u16(), body = %body, "Engine request failed");
            }
            return Err(EngineError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>()
            .await
            .map(Some)
            .map_err(|e| EngineError::Decode(e.to_string()))
    }

    /// Like [`Self::request_optional_json`], but an empty response is an error.
    async fn request_json(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, EngineError> {
        self.request_optional_json(method, path, query, body)
            .await?
            .ok_or(EngineError::Status {
                status: StatusCode::NO_CONTENT.as_u16(),
                body: String::new(),
            })
    }

    async fn get(&self, path: &str) -> Result<Value, EngineError> {
        self.request_json(Method::GET, path, &[], None).await
    }

    /// POST an engine mutation and read back the new engine identity.
    async fn mutate(&self, path: &str, body: Option<&Value>) -> Result<EngineId, EngineError> {
        let value = self.request_json(Method::POST, path, &[], body).await?;
        parse_engine_id(value)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn parse_engine_id(value: Value) -> Result<EngineId, EngineError> {
    match value {
        Value::String(id) if !id.is_empty() => Ok(EngineId::new(id)),
        Value::Number(n) => Ok(EngineId::new(n.to_string())),
        other => Err(EngineError::Decode(format!("Invalid engine id: {}", other))),
    }
}

fn parse_date(value: Value) -> Result<NaiveDate, EngineError> {
    let text = value
        .as_str()
        .ok_or_else(|| EngineError::Decode(format!("Expected date string, got {}", value)))?;
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| EngineError::Decode(e.to_string()))
}

/// Names from a supported-items listing. Items are either bare strings or
/// objects carrying the name under `key`.
fn parse_names(value: Value, key: &str) -> Result<Vec<String>, EngineError> {
    let items: Vec<Value> =
        serde_json::from_value(value).map_err(|e| EngineError::Decode(e.to_string()))?;
    items
        .into_iter()
        .map(|item| match &item {
            Value::String(name) => Ok(name.clone()),
            Value::Object(map) => map
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| EngineError::Decode(format!("Missing {} in {}", key, item))),
            _ => Err(EngineError::Decode(format!("Unexpected item {}", item))),
        })
        .collect()
}

fn to_value<T: serde::Serialize>(body: &T) -> Result<Value, EngineError> {
    serde_json::to_value(body).map_err(|e| EngineError::Decode(e.to_string()))
}

#[async_trait]
impl EngineApi for HttpEngine {
    async fn create_engine(&self, request: &CreateEngineRequest) -> Result<EngineId, EngineError> {
        let body = to_value(request)?;
        self.mutate(&paths::create(), Some(&body)).await
    }

    async fn start_date(&self, engine: &EngineId) -> Result<NaiveDate, EngineError> {
        parse_date(self.get(&paths::start_date(engine)).await?)
    }

    async fn date(&self, engine: &EngineId) -> Result<NaiveDate, EngineError> {
        parse_date(self.get(&paths::date(engine)).await?)
    }

    async fn update(&self, engine: &EngineId, date: NaiveDate) -> Result<EngineId, EngineError> {
        let query = [("date", date.format("%Y-%m-%d").to_string())];
        let value = self
            .request_json(Method::POST, &paths::update(engine), &query, None)
            .await?;
        parse_engine_id(value)
    }

    async fn tickers(&self, engine: &EngineId) -> Result<Vec<String>, EngineError> {
        let value = self.get(&paths::tickers(engine)).await?;
        serde_json::from_value(value).map_err(|e| EngineError::Decode(e.to_string()))
    }

    async fn ticker_ohlc(
        &self,
        engine: &EngineId,
        ticker: &str,
    ) -> Result<Option<Value>, EngineError> {
        let path = paths::ticker_ohlc(engine, ticker);
        match self.request_optional_json(Method::GET, &path, &[], None).await {
            Ok(None | Some(Value::Null)) => Ok(None),
            Ok(value) => Ok(value),
            Err(EngineError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add_ticker(&self, engine: &EngineId, ticker: &str) -> Result<EngineId, EngineError> {
        self.mutate(&paths::add_ticker(engine, ticker), None).await
    }

    async fn remove_ticker(
        &self,
        engine: &EngineId,
        ticker: &str,
    ) -> Result<EngineId, EngineError> {
        self.mutate(&paths::remove_ticker(engine, ticker), None).await
    }

    async fn signal_detectors(
        &self,
        engine: &EngineId,
    ) -> Result<Vec<DetectorRecord>, EngineError> {
        let value = self.get(&paths::signal_detectors(engine)).await?;
        serde_json::from_value(value).map_err(|e| EngineError::Decode(e.to_string()))
    }

    async fn add_signal_detector(
        &self,
        engine: &EngineId,
        spec: &DetectorSpec,
    ) -> Result<EngineId, EngineError> {
        let body = to_value(spec)?;
        self.mutate(&paths::add_signal_detector(engine), Some(&body))
            .await
    }

    async fn remove_signal_detector(
        &self,
        engine: &EngineId,
        detector: DetectorId,
    ) -> Result<EngineId, EngineError> {
        self.mutate(&paths::remove_signal_detector(engine, detector), None)
            .await
    }

    async fn signals(&self, engine: &EngineId) -> Result<Value, EngineError> {
        self.get(&paths::signals(engine)).await
    }

    async fn supported_signal_detectors(&self) -> Result<Vec<String>, EngineError> {
        parse_names(
            self.get(&paths::supported_signal_detectors()).await?,
            "detector_name",
        )
    }

    async fn supported_indicators(&self) -> Result<Vec<String>, EngineError> {
        parse_names(
            self.get(&paths::supported_indicators()).await?,
            "indicator_name",
        )
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned response on a local port.
    async fn serve_once(status_line: &str, body: &str) -> HttpEngine {
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        let config = HttpEngineConfig::new("http://127.0.0.1", port).with_max_connect_retries(0);
        let client = Client::builder().no_proxy().build().unwrap();
        HttpEngine::with_client(config, client).unwrap()
    }

    #[test]
    fn test_base_url() {
        let config = HttpEngineConfig::new("http://stock-market-engine/", 8001);
        assert_eq!(config.base_url(), "http://stock-market-engine:8001");
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = HttpEngine::new(HttpEngineConfig::new("  ", 8001));
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_paths() {
        let engine = EngineId::from("abc");
        assert_eq!(paths::create(), "/create");
        assert_eq!(paths::start_date(&engine), "/getstartdate/abc");
        assert_eq!(paths::update(&engine), "/update/abc");
        assert_eq!(paths::ticker_ohlc(&engine, "AAPL"), "/ticker/abc/AAPL");
        assert_eq!(paths::add_ticker(&engine, "MSFT"), "/addticker/abc/MSFT");
        assert_eq!(
            paths::remove_signal_detector(&engine, 42),
            "/removesignaldetector/abc/42"
        );
        assert_eq!(
            paths::supported_signal_detectors(),
            "/getsupportedsignaldetectors"
        );
    }

    #[test]
    fn test_parse_engine_id() {
        assert_eq!(parse_engine_id(json!("e1")).unwrap(), EngineId::from("e1"));
        assert_eq!(parse_engine_id(json!(17)).unwrap(), EngineId::from("17"));
        assert!(parse_engine_id(json!(null)).is_err());
        assert!(parse_engine_id(json!("")).is_err());
    }

    #[test]
    fn test_parse_names() {
        let value = json!([{"detector_name": "Graph"}, {"detector_name": "Monthly"}, "BiMonthly"]);
        assert_eq!(
            parse_names(value, "detector_name").unwrap(),
            vec!["Graph", "Monthly", "BiMonthly"]
        );
        assert!(parse_names(json!([{"indicator_name": "Identity"}]), "detector_name").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(json!("2021-03-04")).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 4).unwrap()
        );
        assert!(parse_date(json!(20210304)).is_err());
    }

    #[test]
    fn test_truncate() {
        let long = "x".repeat(600);
        assert_eq!(truncate(&long, MAX_LOGGED_BODY).len(), 500);
        assert_eq!(truncate("short", MAX_LOGGED_BODY), "short");
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_error() {
        let config = HttpEngineConfig::new("http://127.0.0.1", 9)
            .with_timeout(Duration::from_millis(200))
            .with_max_connect_retries(0);
        let engine = HttpEngine::new(config).unwrap();
        assert!(engine.supported_signal_detectors().await.is_err());
    }

    #[tokio::test]
    async fn test_ticker_ohlc_no_content() {
        let engine = serve_once("204 No Content", "").await;
        let result = engine.ticker_ohlc(&EngineId::from("e1"), "AAPL").await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_ticker_ohlc_found() {
        let engine = serve_once("200 OK", r#"{"close": [1.5, 2.0]}"#).await;
        let result = engine.ticker_ohlc(&EngineId::from("e1"), "AAPL").await.unwrap();
        assert_eq!(result, Some(json!({"close": [1.5, 2.0]})));
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let engine = serve_once("500 Internal Server Error", "boom").await;
        let result = engine.ticker_ohlc(&EngineId::from("e1"), "AAPL").await;
        match result {
            Err(EngineError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_mutation_is_error() {
        let engine = serve_once("204 No Content", "").await;
        let result = engine.add_ticker(&EngineId::from("e1"), "MSFT").await;
        assert!(matches!(result, Err(EngineError::Status { status: 204, .. })));
    }

    #[tokio::test]
    async fn test_mutation_returns_new_id() {
        let engine = serve_once("200 OK", r#""e2""#).await;
        let result = engine.add_ticker(&EngineId::from("e1"), "MSFT").await.unwrap();
        assert_eq!(result, EngineId::from("e2"));
    }
}
