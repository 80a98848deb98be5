//! Error types for market data operations

use thiserror::Error;

/// Market data specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// Upstream request completed with a non-success HTTP status
    #[error("Upstream returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    /// Tool call named an operation that does not exist in the tool set
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Tool call arguments did not match the operation's parameter schema
    #[error("Invalid arguments for {operation}: {message}")]
    InvalidArguments { operation: String, message: String },

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Upstream payload could not be read as CSV
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Dataset file could not be written
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;
