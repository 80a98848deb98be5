//! Agent graph for finsight
//!
//! A conversation turn flows through a five-stage pipeline:
//!
//! ```text
//! consult_user ──(tool calls?)──> fetch_data ──> write_page ──> persist_page ──> done
//!       └──────────(no tool calls)──────────────────────────────────────────────┘
//! ```
//!
//! The consult stage interprets the user's request and may call market data
//! tools; the fetch stage executes them; the write stage generates a
//! dashboard page from the fetched data; the persist stage saves it. The
//! pipeline is strictly single-pass: one fetch round and one generation
//! round at most, with conditional routing only at the first stage.

pub mod error;
pub mod events;
pub mod graph;
pub mod page;
pub mod prompts;
pub mod stage;

// Re-export main types
pub use error::{AgentError, Result};
pub use events::GraphEvent;
pub use graph::AssistantGraph;
pub use page::PageWriter;
pub use stage::{Stage, next_stage, wants_tools};
