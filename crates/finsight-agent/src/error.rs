//! Error types for the agent graph

use thiserror::Error;

/// Result type alias for agent graph operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that abort a conversation turn
///
/// Tool failures do not appear here: they are appended to the conversation
/// as error tool-results so the pipeline can continue. Only model
/// invocation failures abort the turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Model invocation failed after the provider's fixed retries
    #[error("Model invocation failed: {0}")]
    Model(#[from] finsight_llm::LLMError),
}
