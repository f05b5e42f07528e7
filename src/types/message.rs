//! Provider-agnostic conversation turns

use serde::{Deserialize, Serialize};

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn with_content(role: MessageRole, content: MessageContent) -> Self {
        Self { role, content }
    }

    /// Text view of the turn: plain text as-is, blocks joined by newline with
    /// non-text blocks contributing an empty string.
    pub fn flattened_text(&self) -> String {
        self.content.flattened_text()
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Message content (can be string or array of content blocks)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn blocks(blocks: Vec<ContentBlock>) -> Self {
        MessageContent::Blocks(blocks)
    }

    pub fn flattened_text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .map(|b| match b {
                    ContentBlock::Text { text } => text.as_str(),
                    _ => "",
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Content block (text or tool result)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: serde_json::Value,
    },
    /// Any other block type found in a persisted log (`tool_use`, `image`, ...).
    /// Its payload is dropped and it contributes no text.
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: serde_json::Value) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flattened_text_skips_non_text_blocks() {
        let msg = Message::with_content(
            MessageRole::User,
            MessageContent::blocks(vec![
                ContentBlock::text("first"),
                ContentBlock::tool_result("call-1", json!({"ok": true})),
                ContentBlock::text("second"),
            ]),
        );
        assert_eq!(msg.flattened_text(), "first\n\nsecond");
    }

    #[test]
    fn test_content_deserializes_string_or_blocks() {
        let text: Message = serde_json::from_value(json!({"role": "user", "content": "hi"})).unwrap();
        assert_eq!(text.content, MessageContent::text("hi"));

        let blocks: Message = serde_json::from_value(json!({
            "role": "assistant",
            "content": [{"type": "text", "text": "hello"}]
        }))
        .unwrap();
        assert_eq!(blocks.role, MessageRole::Assistant);
        assert_eq!(blocks.flattened_text(), "hello");
    }

    #[test]
    fn test_unrecognized_block_types_are_tolerated() {
        let msg: Message = serde_json::from_value(json!({
            "role": "assistant",
            "content": [
                {"type": "text", "text": "looking it up"},
                {"type": "tool_use", "id": "call-1", "name": "memory_read", "input": {}},
                {"type": "image", "source": {"data": "..."}}
            ]
        }))
        .unwrap();
        match &msg.content {
            MessageContent::Blocks(blocks) => {
                assert_eq!(blocks.len(), 3);
                assert_eq!(blocks[1], ContentBlock::Unknown);
            }
            other => panic!("expected blocks, got {other:?}"),
        }
        assert_eq!(msg.flattened_text(), "looking it up\n\n");
    }
}
