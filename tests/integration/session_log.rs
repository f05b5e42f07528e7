//! Persist a session, reload it and continue the conversation.

use crate::mock_server::*;
use ai_conductor::conversation::{messages_of, UserEntry};
use ai_conductor::tools::Tool;
use ai_conductor::{load_messages_from_log, ConversationEntry, Message, ToolSet};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct MemoryWrite;

#[async_trait]
impl Tool for MemoryWrite {
    fn name(&self) -> &str {
        "memory_write"
    }
    fn description(&self) -> String {
        "Write a file to the memory directory".to_string()
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {"file_path": {"type": "string"}, "content": {"type": "string"}}})
    }
    async fn invoke(&self, _args: Value) -> anyhow::Result<Value> {
        Ok(json!("Saved"))
    }
}

#[tokio::test]
async fn test_persisted_session_reloads_with_live_tools() {
    let mut fixture = MockServerFixture::new().await;
    fixture.mock_json(200, text_body("Noted.", 4, 6), 1).await;

    let tools = ToolSet::from_tools(vec![Arc::new(MemoryWrite) as Arc<dyn Tool>]);
    let question = Message::user("remember: dentist on friday");
    let turn = fixture
        .client()
        .query(&[question.clone()], &[], &tools, &CancellationToken::new())
        .await
        .unwrap();

    let log = vec![
        ConversationEntry::User(UserEntry::new(question.clone())),
        ConversationEntry::from(turn),
    ];
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, serde_json::to_vec_pretty(&log).unwrap())
        .await
        .unwrap();

    let persisted: Value = serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
    assert_eq!(persisted[1]["type"], "assistant");
    assert_eq!(persisted[1]["tools"], json!(["memory_write"]));

    let loaded = load_messages_from_log(&path, &tools).await.unwrap();
    assert_eq!(loaded.len(), 2);
    let refs = loaded[1].tools().unwrap();
    assert!(refs.is_resolved());
    assert!(refs.resolved().unwrap().get("memory_write").is_some());

    let history = messages_of(&loaded);
    assert_eq!(history, vec![question, Message::assistant("Noted.")]);
}
