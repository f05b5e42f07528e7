//! Gemini generateContent 驱动：对话历史格式化与响应解析
//!
//! Google Gemini generateContent driver. Key points:
//! - Conversation turns become `contents` entries of `{role, parts: [{text}]}`.
//! - Roles: `user` and `model` (an assistant turn is sent as `model`).
//! - Gemini chat history has no system role here: the system directives are sent as a
//!   leading `user` entry. This is a protocol compatibility rule, not an accident.
//! - `generationConfig` wraps temperature, topP, topK, maxOutputTokens.
//! - Tools are sent as one `{functionDeclarations: [...]}` entry, omitted when empty.
//! - Response: `candidates[0].content.parts[*]`, function calls under `functionCall`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tokens::UsageCounters;
use crate::tools::ToolSet;
use crate::types::message::{Message, MessageRole};

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    pub fn new(category: impl Into<String>, threshold: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            threshold: threshold.into(),
        }
    }

    /// Harassment, hate speech and dangerous content blocked at medium and above.
    pub fn defaults() -> Vec<Self> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|c| Self::new(c, "BLOCK_MEDIUM_AND_ABOVE"))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One provider-native history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: String) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclarations {
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// Wire request for `models/{model}:generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(rename = "contents")]
    pub history: Vec<Content>,
    pub generation_config: GenerationConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDeclarations>>,
}

/// A function call issued by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// Raw provider response with typed accessors.
///
/// The JSON is kept verbatim so a recorded response replays byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderResponse {
    raw: Value,
}

impl ProviderResponse {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Concatenated text of the first candidate's parts.
    pub fn text(&self) -> String {
        self.raw
            .pointer("/candidates/0/content/parts")
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Function call embedded in the first part of the first candidate.
    ///
    /// Later parts and other candidates are not inspected.
    pub fn function_call(&self) -> Option<FunctionCall> {
        let call = self.raw.pointer("/candidates/0/content/parts/0/functionCall")?;
        serde_json::from_value(call.clone()).ok()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.raw
            .pointer("/candidates/0/finishReason")
            .and_then(|v| v.as_str())
    }

    /// Reported usage counters, if any.
    ///
    /// Reads `usageMetadata` and falls back to the older
    /// `promptFeedback.tokenCount {totalTokens, promptTokens}` shape.
    pub fn usage(&self) -> Option<UsageCounters> {
        if let Some(u) = self.raw.get("usageMetadata") {
            return Some(UsageCounters {
                total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
                prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
                completion_tokens: u["candidatesTokenCount"].as_u64(),
            });
        }
        self.raw
            .pointer("/promptFeedback/tokenCount")
            .map(|u| UsageCounters {
                total_tokens: u["totalTokens"].as_u64().unwrap_or(0),
                prompt_tokens: u["promptTokens"].as_u64().unwrap_or(0),
                completion_tokens: None,
            })
    }
}

/// Gemini request builder. Pure: the same input always yields the same request.
#[derive(Debug, Clone)]
pub struct GeminiDriver {
    model: String,
    generation: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiDriver {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            generation: GenerationConfig::default(),
            safety_settings: SafetySetting::defaults(),
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = settings;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_role(role: MessageRole) -> &'static str {
        match role {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }

    /// Convert turns plus system directives into provider history.
    ///
    /// Non-empty directives are joined by newline and prepended as a `user` entry.
    pub fn format_history(messages: &[Message], system_prompt: &[String]) -> Vec<Content> {
        let mut history = Vec::with_capacity(messages.len() + 1);
        if !system_prompt.is_empty() {
            history.push(Content::text("user", system_prompt.join("\n")));
        }
        history.extend(
            messages
                .iter()
                .map(|m| Content::text(Self::provider_role(m.role), m.flattened_text())),
        );
        history
    }

    pub fn format_tools(tools: &ToolSet) -> Option<Vec<ToolDeclarations>> {
        if tools.is_empty() {
            return None;
        }
        let function_declarations = tools
            .iter()
            .map(|t| FunctionDeclaration {
                name: t.name().to_string(),
                description: t.description(),
                parameters: t.input_schema(),
            })
            .collect();
        Some(vec![ToolDeclarations {
            function_declarations,
        }])
    }

    pub fn build_request(
        &self,
        messages: &[Message],
        system_prompt: &[String],
        tools: &ToolSet,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            history: Self::format_history(messages, system_prompt),
            generation_config: self.generation.clone(),
            safety_settings: self.safety_settings.clone(),
            tools: Self::format_tools(tools),
        }
    }

    /// Single-prompt request without directives or tools.
    pub fn prompt_request(&self, prompt: &str) -> GenerateContentRequest {
        self.build_request(&[Message::user(prompt)], &[], &ToolSet::new())
    }
}
