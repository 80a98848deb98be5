//! Market tool set execution
//!
//! Dispatches parsed operations against the data source, materializes CSV
//! payloads as dataset files, and shapes results the way the conversation
//! expects: `{csv_file_path, dataset_description}` for file producers, the
//! raw upstream JSON for lookups, and `{error, status_code}` whenever the
//! upstream request fails with a non-success HTTP status.

use crate::client::MarketDataSource;
use crate::config::MarketConfig;
use crate::dataset;
use crate::error::{MarketError, Result};
use crate::ops::{
    self, DailyParams, HistoricalOptionsParams, IntradayParams, MarketOperation,
    RealtimeOptionsParams, SearchParams, SymbolParams,
};
use chrono::Local;
use finsight_llm::ToolDefinition;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

/// The fixed collection of market data operations available to the
/// consult stage
pub struct MarketToolSet {
    source: Arc<dyn MarketDataSource>,
    config: Arc<MarketConfig>,
}

impl MarketToolSet {
    /// Create a tool set over a data source
    pub fn new(source: Arc<dyn MarketDataSource>, config: Arc<MarketConfig>) -> Self {
        Self { source, config }
    }

    /// Tool definitions for every operation in the set
    pub fn definitions() -> Vec<ToolDefinition> {
        ops::definitions()
    }

    /// Execute a tool call by name
    ///
    /// A failed upstream status is not an error from the tool set's point
    /// of view: it becomes the structured `{error, status_code}` value so
    /// the model can react to it. Unknown operations and malformed
    /// arguments remain hard errors for the caller to surface.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        let op = MarketOperation::parse(name, args)?;
        info!("Executing market operation: {}", op.name());

        match self.dispatch(op).await {
            Err(MarketError::UpstreamStatus { status }) => {
                warn!("Upstream request failed with HTTP {status}");
                Ok(json!({
                    "error": "Failed to fetch data",
                    "status_code": status,
                }))
            }
            other => other,
        }
    }

    async fn dispatch(&self, op: MarketOperation) -> Result<Value> {
        match op {
            MarketOperation::TimeSeriesIntraday(params) => self.intraday(params).await,
            MarketOperation::TimeSeriesDaily(params) => self.daily(params).await,
            MarketOperation::TimeSeriesWeekly(params) => self.weekly(params).await,
            MarketOperation::TimeSeriesMonthly(params) => self.monthly(params).await,
            MarketOperation::GlobalQuote(params) => self.global_quote(params).await,
            MarketOperation::SymbolSearch(params) => self.symbol_search(params).await,
            MarketOperation::MarketStatus => self.market_status().await,
            MarketOperation::RealtimeOptions(params) => self.realtime_options(params).await,
            MarketOperation::HistoricalOptions(params) => self.historical_options(params).await,
        }
    }

    /// Materialize a CSV payload and build the success payload around it
    fn materialize(&self, body: &str, filename: &str, heading: String) -> Result<Value> {
        let summary = dataset::summarize_csv(body)?;
        let path = dataset::save_dataset(&self.config.fetch_dir, filename, body)?;

        let description = format!("{heading}\n\n{}", summary.describe());

        Ok(json!({
            "csv_file_path": path.to_string_lossy(),
            "dataset_description": description,
        }))
    }

    async fn intraday(&self, params: IntradayParams) -> Result<Value> {
        let symbol = params.symbol.to_uppercase();

        let mut query = vec![
            ("symbol".to_string(), symbol.clone()),
            ("interval".to_string(), params.interval.clone()),
            ("adjusted".to_string(), params.adjusted.to_string()),
            (
                "extended_hours".to_string(),
                params.extended_hours.to_string(),
            ),
            ("outputsize".to_string(), params.outputsize.clone()),
        ];
        if let Some(month) = &params.month {
            query.push(("month".to_string(), month.clone()));
        }

        let body = self.source.fetch_csv("TIME_SERIES_INTRADAY", &query).await?;

        let filename = dataset::dated_name(
            &symbol,
            &format!("intraday_{}", params.interval),
            &Local::now(),
        );
        let heading = format!(
            "Intraday time series data for {symbol} with {} interval. \
             Adjusted: {}, Extended hours: {}, Outputsize: {}, Month: {}",
            params.interval,
            params.adjusted,
            params.extended_hours,
            params.outputsize,
            params.month.as_deref().unwrap_or("Not specified"),
        );
        self.materialize(&body, &filename, heading)
    }

    async fn daily(&self, params: DailyParams) -> Result<Value> {
        let symbol = params.symbol.to_uppercase();

        let query = vec![
            ("symbol".to_string(), symbol.clone()),
            ("outputsize".to_string(), params.outputsize.clone()),
        ];
        let body = self.source.fetch_csv("TIME_SERIES_DAILY", &query).await?;

        let filename = dataset::dated_name(&symbol, "daily", &Local::now());
        let heading = format!(
            "Daily time series data for {symbol}. Outputsize: {}",
            params.outputsize
        );
        self.materialize(&body, &filename, heading)
    }

    async fn weekly(&self, params: SymbolParams) -> Result<Value> {
        let symbol = params.symbol.to_uppercase();

        let query = vec![("symbol".to_string(), symbol.clone())];
        let body = self.source.fetch_csv("TIME_SERIES_WEEKLY", &query).await?;

        let filename = dataset::dated_name(&symbol, "weekly", &Local::now());
        let heading = format!("Weekly time series data for {symbol}");
        self.materialize(&body, &filename, heading)
    }

    async fn monthly(&self, params: SymbolParams) -> Result<Value> {
        let symbol = params.symbol.to_uppercase();

        let query = vec![("symbol".to_string(), symbol.clone())];
        let body = self.source.fetch_csv("TIME_SERIES_MONTHLY", &query).await?;

        let filename = dataset::dated_name(&symbol, "monthly", &Local::now());
        let heading = format!("Monthly time series data for {symbol}");
        self.materialize(&body, &filename, heading)
    }

    async fn global_quote(&self, params: SymbolParams) -> Result<Value> {
        let query = vec![("symbol".to_string(), params.symbol.to_uppercase())];
        self.source.fetch_json("GLOBAL_QUOTE", &query).await
    }

    async fn symbol_search(&self, params: SearchParams) -> Result<Value> {
        let query = vec![("keywords".to_string(), params.keywords.clone())];
        self.source.fetch_json("SYMBOL_SEARCH", &query).await
    }

    async fn market_status(&self) -> Result<Value> {
        self.source.fetch_json("MARKET_STATUS", &[]).await
    }

    async fn realtime_options(&self, params: RealtimeOptionsParams) -> Result<Value> {
        let symbol = params.symbol.to_uppercase();

        let mut query = vec![("symbol".to_string(), symbol.clone())];
        if let Some(contract) = &params.contract {
            query.push(("contract".to_string(), contract.clone()));
        }
        let body = self.source.fetch_csv("REALTIME_OPTIONS", &query).await?;

        let filename = dataset::timestamped_name(&symbol, "realtime_options", &Local::now());
        let mut heading = format!("Realtime options data for {symbol}");
        if let Some(contract) = &params.contract {
            heading.push_str(&format!(" (Contract: {contract})"));
        }
        self.materialize(&body, &filename, heading)
    }

    async fn historical_options(&self, params: HistoricalOptionsParams) -> Result<Value> {
        let symbol = params.symbol.to_uppercase();

        let mut query = vec![("symbol".to_string(), symbol.clone())];
        if let Some(date) = &params.date {
            query.push(("date".to_string(), date.clone()));
        }
        let body = self.source.fetch_csv("HISTORICAL_OPTIONS", &query).await?;

        let filename = dataset::historical_options_name(&symbol, params.date.as_deref());
        let mut heading = format!("Historical options data for {symbol}");
        if let Some(date) = &params.date {
            heading.push_str(&format!(" on {date}"));
        }
        self.materialize(&body, &filename, heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;

    const SAMPLE_CSV: &str = "\
timestamp,open,high,low,close,volume
2026-07-31,505.10,512.40,501.00,511.25,18230411
2026-06-30,498.70,507.90,490.55,505.02,20118776
";

    /// Scripted data source: either returns a fixed body or fails with a
    /// fixed upstream status
    struct FakeSource {
        csv_body: Option<String>,
        json_body: Option<Value>,
        status: Option<u16>,
    }

    impl FakeSource {
        fn csv(body: &str) -> Self {
            Self {
                csv_body: Some(body.to_string()),
                json_body: None,
                status: None,
            }
        }

        fn json(body: Value) -> Self {
            Self {
                csv_body: None,
                json_body: Some(body),
                status: None,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                csv_body: None,
                json_body: None,
                status: Some(status),
            }
        }
    }

    #[async_trait]
    impl MarketDataSource for FakeSource {
        async fn fetch_csv(&self, _function: &str, _params: &[(String, String)]) -> Result<String> {
            if let Some(status) = self.status {
                return Err(MarketError::UpstreamStatus { status });
            }
            Ok(self.csv_body.clone().expect("scripted CSV body"))
        }

        async fn fetch_json(&self, _function: &str, _params: &[(String, String)]) -> Result<Value> {
            if let Some(status) = self.status {
                return Err(MarketError::UpstreamStatus { status });
            }
            Ok(self.json_body.clone().expect("scripted JSON body"))
        }
    }

    fn toolset(source: FakeSource, fetch_dir: &std::path::Path) -> MarketToolSet {
        let config = MarketConfig::builder()
            .api_key("test_key")
            .fetch_dir(fetch_dir)
            .build()
            .expect("valid config");
        MarketToolSet::new(Arc::new(source), Arc::new(config))
    }

    #[tokio::test]
    async fn test_monthly_writes_dated_file_and_description() {
        let dir = tempfile::tempdir().unwrap();
        let tools = toolset(FakeSource::csv(SAMPLE_CSV), dir.path());

        let result = tools
            .execute(ops::names::TIME_SERIES_MONTHLY, json!({"symbol": "msft"}))
            .await
            .unwrap();

        let path = result["csv_file_path"].as_str().unwrap();
        let expected_name = dataset::dated_name("MSFT", "monthly", &Local::now());
        assert!(path.ends_with(&expected_name));
        assert_eq!(fs::read_to_string(path).unwrap(), SAMPLE_CSV);

        let description = result["dataset_description"].as_str().unwrap();
        assert!(description.contains("Monthly time series data for MSFT"));
        assert!(description.contains("2 rows"));
        assert!(description.contains("6 columns"));
    }

    #[tokio::test]
    async fn test_upstream_failure_yields_structured_error_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let tools = toolset(FakeSource::failing(503), dir.path());

        let result = tools
            .execute(ops::names::TIME_SERIES_DAILY, json!({"symbol": "MSFT"}))
            .await
            .unwrap();

        assert_eq!(result["error"], "Failed to fetch data");
        assert_eq!(result["status_code"], 503);
        // The fetch directory is never created on failure
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_historical_options_failure_is_structured_too() {
        let dir = tempfile::tempdir().unwrap();
        let tools = toolset(FakeSource::failing(500), dir.path());

        let result = tools
            .execute(ops::names::HISTORICAL_OPTIONS, json!({"symbol": "IBM"}))
            .await
            .unwrap();

        assert_eq!(result["error"], "Failed to fetch data");
        assert_eq!(result["status_code"], 500);
    }

    #[tokio::test]
    async fn test_same_day_reinvocation_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let tools = toolset(FakeSource::csv(SAMPLE_CSV), dir.path());

        tools
            .execute(ops::names::TIME_SERIES_MONTHLY, json!({"symbol": "MSFT"}))
            .await
            .unwrap();
        tools
            .execute(ops::names::TIME_SERIES_MONTHLY, json!({"symbol": "MSFT"}))
            .await
            .unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_returns_raw_json() {
        let dir = tempfile::tempdir().unwrap();
        let quote = json!({"Global Quote": {"01. symbol": "MSFT", "05. price": "511.25"}});
        let tools = toolset(FakeSource::json(quote.clone()), dir.path());

        let result = tools
            .execute(ops::names::GLOBAL_QUOTE, json!({"symbol": "MSFT"}))
            .await
            .unwrap();

        assert_eq!(result, quote);
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_unknown_operation_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let tools = toolset(FakeSource::csv(SAMPLE_CSV), dir.path());

        let err = tools.execute("fetch_magic", json!({})).await.unwrap_err();
        assert!(matches!(err, MarketError::UnknownOperation(_)));
    }

    #[tokio::test]
    async fn test_historical_options_file_named_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let tools = toolset(FakeSource::csv(SAMPLE_CSV), dir.path());

        let result = tools
            .execute(
                ops::names::HISTORICAL_OPTIONS,
                json!({"symbol": "IBM", "date": "2026-01-15"}),
            )
            .await
            .unwrap();

        let path = result["csv_file_path"].as_str().unwrap();
        assert!(path.ends_with("ibm_historical_options_2026-01-15.csv"));
    }
}
