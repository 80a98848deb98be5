//! Market data tool set for finsight
//!
//! This crate provides the data-retrieval side of the assistant:
//!
//! - An Alpha Vantage HTTP client with rate limiting and a TTL response cache
//! - Typed market operations parsed from LLM tool calls
//! - CSV dataset materialization with deterministic file naming
//! - A tool set that executes operations and shapes their results for the
//!   conversation

pub mod cache;
pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ops;
pub mod toolset;

// Re-export main types for convenience
pub use cache::{CacheKey, ResponseCache};
pub use client::{AlphaVantageClient, MarketDataSource};
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use ops::MarketOperation;
pub use toolset::MarketToolSet;
