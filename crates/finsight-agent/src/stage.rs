//! Pipeline stages and the transition function
//!
//! The graph is an explicit enumerated state machine. Routing is decided
//! by a pure function over (stage, latest message), so the topology can be
//! tested without invoking a model: the only conditional edge is at the
//! consult stage, and no path re-enters an earlier stage.

use finsight_llm::Message;

/// One stage of the agent graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Interpret the user's request; may emit market data tool calls
    ConsultUser,
    /// Execute pending market data tool calls
    FetchData,
    /// Generate the dashboard page source; emits a page tool call
    WritePage,
    /// Execute the page tool call
    PersistPage,
    /// Terminal
    Done,
}

impl Stage {
    /// Display name of the stage
    pub fn name(self) -> &'static str {
        match self {
            Self::ConsultUser => "consult_user",
            Self::FetchData => "fetch_data",
            Self::WritePage => "write_page",
            Self::PersistPage => "persist_page",
            Self::Done => "done",
        }
    }
}

/// Whether the latest assistant message requests tool execution
///
/// The decision rule for the graph's only conditional edge: any tool use
/// in the message routes the turn into the fetch stage.
pub fn wants_tools(latest: &Message) -> bool {
    latest.has_tool_uses()
}

/// Compute the next stage from the current stage and the latest message
pub fn next_stage(stage: Stage, latest: &Message) -> Stage {
    match stage {
        Stage::ConsultUser => {
            if wants_tools(latest) {
                Stage::FetchData
            } else {
                Stage::Done
            }
        }
        Stage::FetchData => Stage::WritePage,
        Stage::WritePage => Stage::PersistPage,
        Stage::PersistPage | Stage::Done => Stage::Done,
    }
}
