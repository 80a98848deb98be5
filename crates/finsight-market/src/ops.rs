//! Typed market operations
//!
//! Tool calls arrive as an operation name plus JSON arguments. They are
//! parsed into one tagged variant per known operation, each carrying a
//! typed parameter payload; dispatch over the variants is an explicit
//! `match` in the tool set. An unknown name is a hard error.

use crate::error::{MarketError, Result};
use finsight_llm::ToolDefinition;
use finsight_llm::tools::schema;
use serde::Deserialize;
use serde_json::{Value, json};

/// Operation names exposed to the model
pub mod names {
    pub const TIME_SERIES_INTRADAY: &str = "time_series_intraday";
    pub const TIME_SERIES_DAILY: &str = "time_series_daily";
    pub const TIME_SERIES_WEEKLY: &str = "time_series_weekly";
    pub const TIME_SERIES_MONTHLY: &str = "time_series_monthly";
    pub const GLOBAL_QUOTE: &str = "global_quote";
    pub const SYMBOL_SEARCH: &str = "symbol_search";
    pub const MARKET_STATUS: &str = "market_status";
    pub const REALTIME_OPTIONS: &str = "realtime_options";
    pub const HISTORICAL_OPTIONS: &str = "historical_options";
}

fn default_true() -> bool {
    true
}

fn default_outputsize() -> String {
    "compact".to_string()
}

/// Parameters for the intraday time series operation
#[derive(Debug, Clone, Deserialize)]
pub struct IntradayParams {
    pub symbol: String,
    /// Bar interval: 1min, 5min, 15min, 30min, 60min
    pub interval: String,
    #[serde(default = "default_true")]
    pub adjusted: bool,
    #[serde(default = "default_true")]
    pub extended_hours: bool,
    /// Specific month to query, YYYY-MM
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default = "default_outputsize")]
    pub outputsize: String,
}

/// Parameters for the daily time series operation
#[derive(Debug, Clone, Deserialize)]
pub struct DailyParams {
    pub symbol: String,
    #[serde(default = "default_outputsize")]
    pub outputsize: String,
}

/// Parameters for operations taking only a symbol
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolParams {
    pub symbol: String,
}

/// Parameters for symbol search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub keywords: String,
}

/// Parameters for realtime options
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeOptionsParams {
    pub symbol: String,
    /// Specific contract identifier
    #[serde(default)]
    pub contract: Option<String>,
}

/// Parameters for historical options
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalOptionsParams {
    pub symbol: String,
    /// Trading day to query, YYYY-MM-DD; the full history when absent
    #[serde(default)]
    pub date: Option<String>,
}

/// A market operation parsed from a tool call
#[derive(Debug, Clone)]
pub enum MarketOperation {
    TimeSeriesIntraday(IntradayParams),
    TimeSeriesDaily(DailyParams),
    TimeSeriesWeekly(SymbolParams),
    TimeSeriesMonthly(SymbolParams),
    GlobalQuote(SymbolParams),
    SymbolSearch(SearchParams),
    MarketStatus,
    RealtimeOptions(RealtimeOptionsParams),
    HistoricalOptions(HistoricalOptionsParams),
}

impl MarketOperation {
    /// Parse a tool call into a typed operation
    ///
    /// Unknown operation names are a hard error; argument payloads that do
    /// not match the operation's parameter shape are rejected with the
    /// offending operation named.
    pub fn parse(name: &str, args: Value) -> Result<Self> {
        fn payload<T: for<'de> Deserialize<'de>>(name: &str, args: Value) -> Result<T> {
            serde_json::from_value(args).map_err(|e| MarketError::InvalidArguments {
                operation: name.to_string(),
                message: e.to_string(),
            })
        }

        match name {
            names::TIME_SERIES_INTRADAY => Ok(Self::TimeSeriesIntraday(payload(name, args)?)),
            names::TIME_SERIES_DAILY => Ok(Self::TimeSeriesDaily(payload(name, args)?)),
            names::TIME_SERIES_WEEKLY => Ok(Self::TimeSeriesWeekly(payload(name, args)?)),
            names::TIME_SERIES_MONTHLY => Ok(Self::TimeSeriesMonthly(payload(name, args)?)),
            names::GLOBAL_QUOTE => Ok(Self::GlobalQuote(payload(name, args)?)),
            names::SYMBOL_SEARCH => Ok(Self::SymbolSearch(payload(name, args)?)),
            names::MARKET_STATUS => Ok(Self::MarketStatus),
            names::REALTIME_OPTIONS => Ok(Self::RealtimeOptions(payload(name, args)?)),
            names::HISTORICAL_OPTIONS => Ok(Self::HistoricalOptions(payload(name, args)?)),
            _ => Err(MarketError::UnknownOperation(name.to_string())),
        }
    }

    /// The operation's tool name
    pub fn name(&self) -> &'static str {
        match self {
            Self::TimeSeriesIntraday(_) => names::TIME_SERIES_INTRADAY,
            Self::TimeSeriesDaily(_) => names::TIME_SERIES_DAILY,
            Self::TimeSeriesWeekly(_) => names::TIME_SERIES_WEEKLY,
            Self::TimeSeriesMonthly(_) => names::TIME_SERIES_MONTHLY,
            Self::GlobalQuote(_) => names::GLOBAL_QUOTE,
            Self::SymbolSearch(_) => names::SYMBOL_SEARCH,
            Self::MarketStatus => names::MARKET_STATUS,
            Self::RealtimeOptions(_) => names::REALTIME_OPTIONS,
            Self::HistoricalOptions(_) => names::HISTORICAL_OPTIONS,
        }
    }
}

/// Tool definitions for every market operation, for the consult stage
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            names::TIME_SERIES_INTRADAY,
            "Intraday time series of the specified equity, covering extended trading hours \
             where applicable. Writes a CSV dataset file.",
            schema::object(
                json!({
                    "symbol": schema::string("Equity ticker symbol, e.g. MSFT"),
                    "interval": schema::string_enum(
                        "Time interval between data points",
                        &["1min", "5min", "15min", "30min", "60min"],
                    ),
                    "adjusted": schema::boolean("Adjust output for splits and dividends (default true)"),
                    "extended_hours": schema::boolean("Include extended trading hours (default true)"),
                    "month": schema::string("Specific month to query, YYYY-MM"),
                    "outputsize": schema::string_enum("Amount of data to return", &["compact", "full"]),
                }),
                vec!["symbol", "interval"],
            ),
        ),
        ToolDefinition::new(
            names::TIME_SERIES_DAILY,
            "Daily time series of the specified global equity, covering 20+ years of \
             historical data. Writes a CSV dataset file.",
            schema::object(
                json!({
                    "symbol": schema::string("Equity ticker symbol, e.g. MSFT"),
                    "outputsize": schema::string_enum("Amount of data to return", &["compact", "full"]),
                }),
                vec!["symbol"],
            ),
        ),
        ToolDefinition::new(
            names::TIME_SERIES_WEEKLY,
            "Weekly time series of the specified global equity, covering 20+ years of \
             historical data. Writes a CSV dataset file.",
            schema::object(
                json!({
                    "symbol": schema::string("Equity ticker symbol, e.g. MSFT"),
                }),
                vec!["symbol"],
            ),
        ),
        ToolDefinition::new(
            names::TIME_SERIES_MONTHLY,
            "Monthly time series of the specified global equity, covering 20+ years of \
             historical data. Writes a CSV dataset file.",
            schema::object(
                json!({
                    "symbol": schema::string("Equity ticker symbol, e.g. MSFT"),
                }),
                vec!["symbol"],
            ),
        ),
        ToolDefinition::new(
            names::GLOBAL_QUOTE,
            "Latest price and volume information for a ticker.",
            schema::object(
                json!({
                    "symbol": schema::string("Equity ticker symbol, e.g. MSFT"),
                }),
                vec!["symbol"],
            ),
        ),
        ToolDefinition::new(
            names::SYMBOL_SEARCH,
            "Best-matching symbols and market information based on keywords.",
            schema::object(
                json!({
                    "keywords": schema::string("Search keywords, e.g. a company name"),
                }),
                vec!["keywords"],
            ),
        ),
        ToolDefinition::new(
            names::MARKET_STATUS,
            "Current market status (open vs. closed) of major trading venues for equities, \
             forex, and cryptocurrencies.",
            schema::object(json!({}), vec![]),
        ),
        ToolDefinition::new(
            names::REALTIME_OPTIONS,
            "Realtime US options data with full market coverage for a given equity symbol. \
             Writes a CSV dataset file.",
            schema::object(
                json!({
                    "symbol": schema::string("Equity ticker symbol, e.g. MSFT"),
                    "contract": schema::string("Specific US options contract ID"),
                }),
                vec!["symbol"],
            ),
        ),
        ToolDefinition::new(
            names::HISTORICAL_OPTIONS,
            "Full historical options chain for a specific symbol, optionally on a specific \
             date. Writes a CSV dataset file.",
            schema::object(
                json!({
                    "symbol": schema::string("Equity ticker symbol, e.g. MSFT"),
                    "date": schema::string("Trading day to query, YYYY-MM-DD"),
                }),
                vec!["symbol"],
            ),
        ),
    ]
}
