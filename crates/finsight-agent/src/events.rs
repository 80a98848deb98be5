//! Turn events streamed to the frontend

use crate::stage::Stage;
use finsight_llm::Message;

/// Intermediate output of a running turn
///
/// The frontend receives these over a channel while the turn executes, so
/// it can render progress instead of waiting for the final reply.
#[derive(Debug, Clone)]
pub enum GraphEvent {
    /// The pipeline entered a stage
    StageEntered(Stage),

    /// An assistant stage produced a message
    Assistant {
        /// Stage that produced the message
        stage: Stage,
        /// The message, including any tool calls
        message: Message,
    },

    /// A tool call finished executing
    ToolCompleted {
        /// Operation name
        name: String,
        /// Result content as appended to the conversation
        output: String,
        /// Whether the result is an error
        is_error: bool,
    },

    /// The generated page was saved
    PageSaved {
        /// Path of the page file
        path: String,
    },
}
