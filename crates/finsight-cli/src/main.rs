//! Finsight assistant CLI
//!
//! An interactive read/print loop over the assistant graph. Each turn is
//! run in the background while streamed graph events are printed as they
//! arrive.
//!
//! # Usage
//!
//! ```bash
//! export ANTHROPIC_API_KEY="sk-..."
//! export ALPHA_VANTAGE_API_KEY="..."
//!
//! cargo run --bin finsight
//! ```

use anyhow::Context;
use clap::Parser;
use finsight_agent::{AssistantGraph, GraphEvent, PageWriter};
use finsight_llm::{AnthropicProvider, Message, ModelConfig};
use finsight_market::{AlphaVantageClient, MarketConfig, MarketToolSet};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "finsight")]
#[command(about = "Conversational market data assistant", long_about = None)]
struct Args {
    /// Model used by both assistant stages
    #[arg(long)]
    model: Option<String>,

    /// Directory fetched dataset files are written to
    #[arg(long)]
    fetch_dir: Option<PathBuf>,

    /// Path of the generated dashboard page
    #[arg(long)]
    page_path: Option<PathBuf>,
}

fn print_banner() {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║                     Finsight Assistant                       ║
║                                                              ║
║  Ask for market data in natural language, for example:       ║
║    show me last 5 years of MSFT data monthly                 ║
║                                                              ║
║  Fetched datasets are saved as CSV files and a dashboard     ║
║  page is generated to visualize them.                        ║
║                                                              ║
║  Type quit, exit, or q to leave.                             ║
╚══════════════════════════════════════════════════════════════╝
"
    );
}

fn print_event(event: &GraphEvent) {
    match event {
        GraphEvent::StageEntered(stage) => {
            println!("[{}]", stage.name());
        }
        GraphEvent::Assistant { message, .. } => {
            if let Some(text) = message.text() {
                if !text.is_empty() {
                    println!("Assistant: {text}");
                }
            }
            for tool_use in message.tool_uses() {
                if let finsight_llm::ContentBlock::ToolUse { name, .. } = tool_use {
                    println!("  -> calling {name}");
                }
            }
        }
        GraphEvent::ToolCompleted {
            name,
            output,
            is_error,
        } => {
            let excerpt: String = output.chars().take(200).collect();
            let marker = if *is_error { "!" } else { "=" };
            println!("  {marker} {name}: {excerpt}");
        }
        GraphEvent::PageSaved { path } => {
            println!("  Dashboard page saved to {path}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,finsight=info".to_string()),
        )
        .init();

    let args = Args::parse();

    info!("Starting finsight CLI");

    print_banner();

    // Missing data-provider key is fatal before the loop starts
    let api_key = std::env::var("ALPHA_VANTAGE_API_KEY")
        .context("ALPHA_VANTAGE_API_KEY environment variable is not set")?;

    let mut market_builder = MarketConfig::builder().api_key(api_key);
    if let Some(dir) = args.fetch_dir {
        market_builder = market_builder.fetch_dir(dir);
    }
    let market_config = Arc::new(market_builder.build()?);

    let provider = Arc::new(AnthropicProvider::from_env()?);
    let model = args
        .model
        .map_or_else(ModelConfig::default, |name| ModelConfig::new(name));

    let client = AlphaVantageClient::new(&market_config)?;
    let market = MarketToolSet::new(Arc::new(client), Arc::clone(&market_config));

    let page_writer = args
        .page_path
        .map_or_else(PageWriter::default, |path| PageWriter::new(path));

    println!("Configuration:");
    println!("  Model: {}", model.model);
    println!("  Fetch directory: {}", market_config.fetch_dir.display());
    println!("  Page path: {}", page_writer.path().display());
    println!();

    let graph = Arc::new(AssistantGraph::new(provider, model, market, page_writer));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut conversation: Vec<Message> = Vec::new();

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("Goodbye!");
            break;
        }

        conversation.push(Message::user(input));
        let backup = conversation.clone();

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn({
            let graph = Arc::clone(&graph);
            let turn_input = std::mem::take(&mut conversation);
            async move { graph.run_turn(turn_input, &sender).await }
        });

        while let Some(event) = receiver.recv().await {
            print_event(&event);
        }

        match handle.await? {
            Ok((updated, _reply)) => conversation = updated,
            Err(e) => {
                // The failed turn is lost; the user has to re-ask
                eprintln!("Turn failed: {e}");
                conversation = backup;
            }
        }
        println!();
    }

    Ok(())
}
