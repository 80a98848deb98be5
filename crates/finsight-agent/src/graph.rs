//! The assistant graph executor
//!
//! Runs one conversation turn through the pipeline. Both assistant stages
//! share one model configuration and one provider; the fetch stage
//! executes tool calls sequentially against the market tool set, and the
//! persist stage executes the page tool. A turn always performs at most
//! one fetch round and one generation round.

use crate::error::Result;
use crate::events::GraphEvent;
use crate::page::{PageWriter, SAVE_PAGE_TOOL};
use crate::prompts;
use crate::stage::{Stage, next_stage};
use finsight_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, ModelConfig, ToolDefinition,
};
use finsight_market::MarketToolSet;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// The five-stage assistant pipeline
pub struct AssistantGraph {
    provider: Arc<dyn LLMProvider>,
    model: ModelConfig,
    market: MarketToolSet,
    page_writer: PageWriter,
}

impl AssistantGraph {
    /// Create a graph over a provider, model configuration, market tool
    /// set, and page writer
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        model: ModelConfig,
        market: MarketToolSet,
        page_writer: PageWriter,
    ) -> Self {
        Self {
            provider,
            model,
            market,
            page_writer,
        }
    }

    /// Run one conversation turn to completion
    ///
    /// Takes the conversation (already ending in the user's message),
    /// streams [`GraphEvent`]s to `events` while the turn progresses, and
    /// returns the extended conversation together with the final
    /// user-facing reply text. Tool failures are appended to the
    /// conversation as error results; only model invocation failures abort
    /// the turn.
    pub async fn run_turn(
        &self,
        mut conversation: Vec<Message>,
        events: &UnboundedSender<GraphEvent>,
    ) -> Result<(Vec<Message>, String)> {
        let mut stage = Stage::ConsultUser;
        let mut reply = String::new();

        while stage != Stage::Done {
            let _ = events.send(GraphEvent::StageEntered(stage));
            debug!("Entering stage: {}", stage.name());

            match stage {
                Stage::ConsultUser => {
                    let message = self
                        .invoke(&conversation, prompts::CONSULT_USER, MarketToolSet::definitions())
                        .await?;
                    if let Some(text) = message.text() {
                        if !text.is_empty() {
                            reply = text.to_string();
                        }
                    }
                    let _ = events.send(GraphEvent::Assistant {
                        stage,
                        message: message.clone(),
                    });
                    stage = next_stage(stage, &message);
                    conversation.push(message);
                }

                Stage::FetchData => {
                    let latest = conversation
                        .last()
                        .cloned()
                        .expect("conversation cannot be empty mid-turn");
                    let results = self.execute_market_tools(&latest, events).await;
                    let message = Message::tool_results(results);
                    stage = next_stage(stage, &message);
                    conversation.push(message);
                }

                Stage::WritePage => {
                    let message = self
                        .invoke(&conversation, prompts::WRITE_PAGE, vec![PageWriter::definition()])
                        .await?;
                    if let Some(text) = message.text() {
                        if !text.is_empty() {
                            reply = text.to_string();
                        }
                    }
                    let _ = events.send(GraphEvent::Assistant {
                        stage,
                        message: message.clone(),
                    });
                    stage = next_stage(stage, &message);
                    conversation.push(message);
                }

                Stage::PersistPage => {
                    let latest = conversation
                        .last()
                        .cloned()
                        .expect("conversation cannot be empty mid-turn");
                    let results = self.execute_page_tools(&latest, events);
                    if !results.is_empty() {
                        conversation.push(Message::tool_results(results));
                    }
                    let message = conversation
                        .last()
                        .expect("conversation cannot be empty mid-turn");
                    stage = next_stage(stage, message);
                }

                Stage::Done => unreachable!("loop exits before Done"),
            }
        }

        info!("Turn completed");
        Ok((conversation, reply))
    }

    /// Invoke the model with a stage system prompt and tool set
    async fn invoke(
        &self,
        conversation: &[Message],
        system: &str,
        tools: Vec<ToolDefinition>,
    ) -> Result<Message> {
        let mut builder = CompletionRequest::builder(&self.model.model)
            .messages(conversation.to_vec())
            .system(system)
            .max_tokens(self.model.max_tokens)
            .tools(tools);
        if let Some(temperature) = self.model.temperature {
            builder = builder.temperature(temperature);
        }

        let response = self.provider.complete(builder.build()).await?;
        Ok(response.message)
    }

    /// Execute every pending market tool call, sequentially
    async fn execute_market_tools(
        &self,
        latest: &Message,
        events: &UnboundedSender<GraphEvent>,
    ) -> Vec<ContentBlock> {
        let tool_uses = latest.tool_uses();
        debug!("Executing {} market tool call(s)", tool_uses.len());

        let mut blocks = Vec::new();
        for tool_use in tool_uses {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            match self.market.execute(name, input.clone()).await {
                Ok(value) => {
                    let content = value.to_string();
                    let _ = events.send(GraphEvent::ToolCompleted {
                        name: name.clone(),
                        output: content.clone(),
                        is_error: false,
                    });
                    blocks.push(ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content,
                        is_error: None,
                    });
                }
                Err(e) => {
                    warn!("Tool {name} execution failed: {e}");
                    let content = format!("Error: {e}");
                    let _ = events.send(GraphEvent::ToolCompleted {
                        name: name.clone(),
                        output: content.clone(),
                        is_error: true,
                    });
                    blocks.push(ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content,
                        is_error: Some(true),
                    });
                }
            }
        }
        blocks
    }

    /// Execute the page tool call(s) from the write stage
    fn execute_page_tools(
        &self,
        latest: &Message,
        events: &UnboundedSender<GraphEvent>,
    ) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();
        for tool_use in latest.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            if name != SAVE_PAGE_TOOL {
                warn!("Write stage called unknown tool: {name}");
                blocks.push(ContentBlock::ToolResult {
                    tool_use_id: id.clone(),
                    content: format!("Error: unknown tool {name}"),
                    is_error: Some(true),
                });
                continue;
            }

            let Some(source_code) = input.get("source_code").and_then(|v| v.as_str()) else {
                blocks.push(ContentBlock::ToolResult {
                    tool_use_id: id.clone(),
                    content: "Error: missing source_code parameter".to_string(),
                    is_error: Some(true),
                });
                continue;
            };

            let content = match self.page_writer.try_save(source_code) {
                Ok(path) => {
                    let path = path.to_string_lossy().into_owned();
                    let _ = events.send(GraphEvent::PageSaved { path: path.clone() });
                    path
                }
                Err(e) => format!("Error saving dashboard page: {e}"),
            };
            let _ = events.send(GraphEvent::ToolCompleted {
                name: name.clone(),
                output: content.clone(),
                is_error: false,
            });
            blocks.push(ContentBlock::ToolResult {
                tool_use_id: id.clone(),
                content,
                is_error: None,
            });
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Local;
    use finsight_llm::{
        CompletionResponse, MessageContent, Role, StopReason, TokenUsage,
    };
    use finsight_market::{MarketConfig, MarketDataSource};
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    const SAMPLE_CSV: &str = "\
timestamp,open,high,low,close,volume
2026-07-31,505.10,512.40,501.00,511.25,18230411
2026-06-30,498.70,507.90,490.55,505.02,20118776
";

    /// Provider returning a scripted sequence of responses
    struct FakeProvider {
        responses: Mutex<VecDeque<CompletionResponse>>,
    }

    impl FakeProvider {
        fn new(messages: Vec<Message>) -> Self {
            let responses = messages
                .into_iter()
                .map(|message| {
                    let stop_reason = if message.has_tool_uses() {
                        StopReason::ToolUse
                    } else {
                        StopReason::EndTurn
                    };
                    CompletionResponse {
                        message,
                        stop_reason,
                        usage: TokenUsage {
                            input_tokens: 0,
                            output_tokens: 0,
                        },
                    }
                })
                .collect();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for FakeProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> finsight_llm::Result<CompletionResponse> {
            Ok(self
                .responses
                .lock()
                .expect("lock poisoned")
                .pop_front()
                .expect("scripted response available"))
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    /// Data source returning a fixed CSV body
    struct FakeSource;

    #[async_trait]
    impl MarketDataSource for FakeSource {
        async fn fetch_csv(
            &self,
            _function: &str,
            _params: &[(String, String)],
        ) -> finsight_market::Result<String> {
            Ok(SAMPLE_CSV.to_string())
        }

        async fn fetch_json(
            &self,
            _function: &str,
            _params: &[(String, String)],
        ) -> finsight_market::Result<Value> {
            Ok(json!({}))
        }
    }

    fn tool_use(id: &str, name: &str, input: Value) -> ContentBlock {
        ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }
    }

    fn assistant_blocks(blocks: Vec<ContentBlock>) -> Message {
        Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
        }
    }

    fn build_graph(
        scripted: Vec<Message>,
        fetch_dir: &std::path::Path,
        page_path: &std::path::Path,
    ) -> AssistantGraph {
        let config = MarketConfig::builder()
            .api_key("test_key")
            .fetch_dir(fetch_dir)
            .build()
            .expect("valid config");
        let market = MarketToolSet::new(Arc::new(FakeSource), Arc::new(config));

        AssistantGraph::new(
            Arc::new(FakeProvider::new(scripted)),
            ModelConfig::default(),
            market,
            PageWriter::new(page_path),
        )
    }

    fn drain(receiver: &mut mpsc::UnboundedReceiver<GraphEvent>) -> Vec<GraphEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    fn stages_entered(events: &[GraphEvent]) -> Vec<Stage> {
        events
            .iter()
            .filter_map(|e| match e {
                GraphEvent::StageEntered(stage) => Some(*stage),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_plain_reply_terminates_without_fetching() {
        let fetch_dir = tempfile::tempdir().unwrap();
        let page_dir = tempfile::tempdir().unwrap();
        let page_path = page_dir.path().join("generated_dashboard.html");

        let graph = build_graph(
            vec![Message::assistant("Hello! Ask me about market data.")],
            fetch_dir.path(),
            &page_path,
        );

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let (conversation, reply) = graph
            .run_turn(vec![Message::user("hello")], &sender)
            .await
            .unwrap();

        assert_eq!(reply, "Hello! Ask me about market data.");
        assert_eq!(conversation.len(), 2);

        let events = drain(&mut receiver);
        assert_eq!(stages_entered(&events), vec![Stage::ConsultUser]);

        // No files written anywhere
        assert!(fs::read_dir(fetch_dir.path()).unwrap().next().is_none());
        assert!(!page_path.exists());
    }

    #[tokio::test]
    async fn test_full_pipeline_fetches_and_persists() {
        let fetch_dir = tempfile::tempdir().unwrap();
        let page_dir = tempfile::tempdir().unwrap();
        let page_path = page_dir.path().join("generated_dashboard.html");

        let graph = build_graph(
            vec![
                assistant_blocks(vec![
                    ContentBlock::Text {
                        text: "Fetched monthly MSFT data for the last 5 years.".to_string(),
                    },
                    tool_use("call_1", "time_series_monthly", json!({"symbol": "MSFT"})),
                ]),
                assistant_blocks(vec![tool_use(
                    "call_2",
                    SAVE_PAGE_TOOL,
                    json!({"source_code": "<html>msft dashboard</html>"}),
                )]),
            ],
            fetch_dir.path(),
            &page_path,
        );

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let (conversation, reply) = graph
            .run_turn(
                vec![Message::user("show me last 5 years of MSFT data monthly")],
                &sender,
            )
            .await
            .unwrap();

        // user, consult assistant, tool results, write assistant, page result
        assert_eq!(conversation.len(), 5);
        assert_eq!(reply, "Fetched monthly MSFT data for the last 5 years.");

        // Dataset file written under the deterministic name
        let expected = format!("msft_monthly_{}.csv", Local::now().format("%Y%m%d"));
        assert!(fetch_dir.path().join(&expected).exists());

        // Tool result carries the dataset description
        let fetch_result = conversation[2].text();
        assert!(fetch_result.is_none()); // block content, not plain text
        match &conversation[2].content {
            Some(MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    assert_eq!(tool_use_id, "call_1");
                    assert!(content.contains("2 rows"));
                    assert!(is_error.is_none());
                }
                other => panic!("unexpected block: {other:?}"),
            },
            other => panic!("unexpected content: {other:?}"),
        }

        // Page persisted at the fixed path, content verbatim
        assert_eq!(
            fs::read_to_string(&page_path).unwrap(),
            "<html>msft dashboard</html>"
        );

        let events = drain(&mut receiver);
        assert_eq!(
            stages_entered(&events),
            vec![
                Stage::ConsultUser,
                Stage::FetchData,
                Stage::WritePage,
                Stage::PersistPage
            ]
        );
        assert!(events.iter().any(|e| matches!(
            e,
            GraphEvent::PageSaved { path } if path.ends_with("generated_dashboard.html")
        )));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_error_result_and_pipeline_continues() {
        let fetch_dir = tempfile::tempdir().unwrap();
        let page_dir = tempfile::tempdir().unwrap();
        let page_path = page_dir.path().join("generated_dashboard.html");

        let graph = build_graph(
            vec![
                assistant_blocks(vec![tool_use("call_1", "fetch_magic", json!({}))]),
                // Write stage emits no tool call; there is no retry
                Message::assistant("I could not generate a page."),
            ],
            fetch_dir.path(),
            &page_path,
        );

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let (conversation, _reply) = graph
            .run_turn(vec![Message::user("do something odd")], &sender)
            .await
            .unwrap();

        match &conversation[2].content {
            Some(MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => {
                    assert!(content.contains("Unknown operation"));
                    assert_eq!(*is_error, Some(true));
                }
                other => panic!("unexpected block: {other:?}"),
            },
            other => panic!("unexpected content: {other:?}"),
        }

        // Once data fetching started, the pipeline still reaches persist
        let events = drain(&mut receiver);
        assert_eq!(
            stages_entered(&events),
            vec![
                Stage::ConsultUser,
                Stage::FetchData,
                Stage::WritePage,
                Stage::PersistPage
            ]
        );
        assert!(!page_path.exists());
    }

    #[tokio::test]
    async fn test_page_overwritten_across_turns() {
        let fetch_dir = tempfile::tempdir().unwrap();
        let page_dir = tempfile::tempdir().unwrap();
        let page_path = page_dir.path().join("generated_dashboard.html");

        for (i, source) in ["<html>first</html>", "<html>second</html>"]
            .into_iter()
            .enumerate()
        {
            let graph = build_graph(
                vec![
                    assistant_blocks(vec![tool_use(
                        "call_1",
                        "time_series_daily",
                        json!({"symbol": "MSFT"}),
                    )]),
                    assistant_blocks(vec![tool_use(
                        "call_2",
                        SAVE_PAGE_TOOL,
                        json!({"source_code": source}),
                    )]),
                ],
                fetch_dir.path(),
                &page_path,
            );

            let (sender, _receiver) = mpsc::unbounded_channel();
            graph
                .run_turn(vec![Message::user(format!("turn {i}"))], &sender)
                .await
                .unwrap();
        }

        // Exactly one page file, holding only the latest content
        assert_eq!(
            fs::read_to_string(&page_path).unwrap(),
            "<html>second</html>"
        );
        let entries: Vec<_> = fs::read_dir(page_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
