//! Normalized assistant turns returned by the client.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::{ContentBlock, MessageContent, MessageRole};
use crate::tools::ToolRefs;

pub const NO_CONTENT_MESSAGE: &str = "(no content)";
pub const API_ERROR_MESSAGE_PREFIX: &str = "API Error";
pub const INVALID_API_KEY_ERROR_MESSAGE: &str = "Invalid API key · Please check your GOOGLE_API_KEY";
pub const SYNTHETIC_MODEL: &str = "<synthetic>";

/// Token counters reported for a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Provider-shaped message body of an assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: MessageRole,
    pub content: MessageContent,
    pub id: String,
    pub model: String,
    #[serde(rename = "type", default = "message_type")]
    pub kind: String,
    #[serde(default)]
    pub usage: Usage,
}

fn message_type() -> String {
    "message".to_string()
}

/// An assistant turn plus the call metadata that produced it.
///
/// Serialized standalone this has no `type` field; it is tagged `"assistant"`
/// when wrapped in [`crate::conversation::ConversationEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub message: ApiMessage,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub uuid: String,
    #[serde(
        rename = "isApiErrorMessage",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_api_error_message: bool,
    #[serde(default)]
    pub tools: ToolRefs,
}

impl AssistantMessage {
    pub fn new(content: impl Into<String>, model: impl Into<String>, usage: Usage) -> Self {
        Self {
            message: ApiMessage {
                role: MessageRole::Assistant,
                content: MessageContent::Text(content.into()),
                id: Uuid::new_v4().to_string(),
                model: model.into(),
                kind: message_type(),
                usage,
            },
            cost_usd: 0.0,
            duration_ms: 0,
            uuid: Uuid::new_v4().to_string(),
            is_api_error_message: false,
            tools: ToolRefs::default(),
        }
    }

    /// Error turn used in place of a failed provider call.
    pub fn api_error(content: impl Into<String>) -> Self {
        let mut msg = Self::new(String::new(), SYNTHETIC_MODEL, Usage::default());
        msg.message.content = MessageContent::Blocks(vec![ContentBlock::text(content)]);
        msg.is_api_error_message = true;
        msg
    }

    pub fn with_cost(mut self, cost_usd: f64, duration_ms: u64) -> Self {
        self.cost_usd = cost_usd;
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_tools(mut self, tools: ToolRefs) -> Self {
        self.tools = tools;
        self
    }

    pub fn text(&self) -> String {
        self.message.content.flattened_text()
    }
}
