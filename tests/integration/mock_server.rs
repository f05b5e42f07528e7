//! Mock HTTP server setup for integration tests

use ai_conductor::tokens::CostLedger;
use ai_conductor::{ConversationRecorder, GeminiClient, GeminiClientBuilder, RetryPolicy};
use mockito::{Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const MODEL: &str = "gemini-pro";
pub const API_KEY: &str = "test-key";
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-pro:generateContent";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Builder pointed at the mock server, with a private ledger, no recording and a
    /// fast retry policy.
    pub fn builder(&self) -> GeminiClientBuilder {
        GeminiClient::builder()
            .api_key(API_KEY)
            .model(MODEL)
            .base_url(&self.base_url)
            .ledger(Arc::new(CostLedger::new()))
            .recorder(ConversationRecorder::passthrough())
            .retry_policy(RetryPolicy::default().with_base_delay(Duration::from_millis(5)))
    }

    pub fn client(&self) -> GeminiClient {
        self.builder().build().expect("client builds")
    }

    /// Create a mock for a JSON response served `hits` times
    pub async fn mock_json(&mut self, status: usize, body: Value, hits: usize) -> Mock {
        self.server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", API_KEY)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }
}

pub fn text_body(text: &str, prompt_tokens: u64, total_tokens: u64) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {
            "promptTokenCount": prompt_tokens,
            "candidatesTokenCount": total_tokens - prompt_tokens,
            "totalTokenCount": total_tokens
        }
    })
}

pub fn function_call_body(name: &str, args: Value) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"functionCall": {"name": name, "args": args}}], "role": "model"},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 10, "totalTokenCount": 30}
    })
}

pub fn error_body(code: u16, status: &str, message: &str) -> Value {
    json!({"error": {"code": code, "message": message, "status": status}})
}
