//! Basic query with two memory tools.
//!
//! Sends one question to Gemini with `memory_read` / `memory_write` tools backed by a
//! local directory, prints the answer and the running cost.
//!
//! Prerequisites:
//! - GOOGLE_API_KEY (required)
//! - GEMINI_MODEL (optional, default gemini-pro)
//! - AI_VCR_MODE=record|replay and AI_VCR_DIR (optional)
//!
//! Usage:
//!   GOOGLE_API_KEY=... cargo run --example basic_query -- "Remember that my dentist is on Friday"

use ai_conductor::config::has_api_key;
use ai_conductor::tokens::global_ledger;
use ai_conductor::tools::Tool;
use ai_conductor::{GeminiClient, Message, ToolSet};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct MemoryRead {
    root: PathBuf,
}

#[async_trait]
impl Tool for MemoryRead {
    fn name(&self) -> &str {
        "memory_read"
    }

    fn description(&self) -> String {
        "Read contents from the memory directory. Omit file_path to list all memory files."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string", "description": "Path relative to the memory directory"}
            }
        })
    }

    async fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        match args.get("file_path").and_then(|v| v.as_str()) {
            Some(path) => {
                let content = tokio::fs::read_to_string(self.root.join(path)).await?;
                Ok(Value::String(content))
            }
            None => {
                let mut files = Vec::new();
                if let Ok(mut dir) = tokio::fs::read_dir(&self.root).await {
                    while let Some(entry) = dir.next_entry().await? {
                        files.push(entry.file_name().to_string_lossy().into_owned());
                    }
                }
                files.sort();
                Ok(json!({ "files": files }))
            }
        }
    }
}

struct MemoryWrite {
    root: PathBuf,
}

#[async_trait]
impl Tool for MemoryWrite {
    fn name(&self) -> &str {
        "memory_write"
    }

    fn description(&self) -> String {
        "Write content to a memory file, creating directories as needed.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["file_path", "content"]
        })
    }

    async fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        let path = args["file_path"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("file_path is required"))?;
        let content = args["content"].as_str().unwrap_or_default();
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, content).await?;
        Ok(Value::String("Saved".to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if !has_api_key() {
        eprintln!("GOOGLE_API_KEY is not set; export it and run again.");
        std::process::exit(1);
    }

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What do you have in memory?".to_string());

    let root = std::env::temp_dir().join("ai-conductor-memory");
    let tools = ToolSet::from_tools(vec![
        Arc::new(MemoryRead { root: root.clone() }) as Arc<dyn Tool>,
        Arc::new(MemoryWrite { root }) as Arc<dyn Tool>,
    ]);

    let client = GeminiClient::from_env()?;
    println!("model: {} ({:?})", client.model(), client.recorder().mode());

    let turn = client
        .query(
            &[Message::user(question)],
            &["You are a helpful assistant with a persistent memory directory.".to_string()],
            &tools,
            &CancellationToken::new(),
        )
        .await?;

    println!("\n{}\n", turn.text());
    let totals = global_ledger().totals();
    println!(
        "cost: ${:.6} this call, ${:.6} total over {} call(s), {} ms",
        turn.cost_usd,
        totals.total_cost_usd,
        totals.calls,
        totals.total_duration.as_millis()
    );
    Ok(())
}
