//! LLM provider abstraction for finsight
//!
//! This crate provides provider-agnostic abstractions for interacting with
//! Large Language Models (LLMs). It includes:
//!
//! - Message types for conversation threading
//! - Completion request/response types
//! - Tool definitions for function calling
//! - Provider trait and the Anthropic implementation
//! - A shared model configuration value

pub mod completion;
pub mod config;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use config::ModelConfig;
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use providers::AnthropicProvider;
pub use tools::ToolDefinition;
