//! End-to-end `query` behaviour over HTTP.

use crate::mock_server::*;
use ai_conductor::tools::Tool;
use ai_conductor::types::assistant::INVALID_API_KEY_ERROR_MESSAGE;
use ai_conductor::{Message, ToolSet};
use async_trait::async_trait;
use mockito::Matcher;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct MemoryRead {
    calls: AtomicUsize,
}

#[async_trait]
impl Tool for MemoryRead {
    fn name(&self) -> &str {
        "memory_read"
    }
    fn description(&self) -> String {
        "Read a file from the memory directory".to_string()
    }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"file_path": {"type": "string"}},
            "required": ["file_path"]
        })
    }
    async fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let path = args["file_path"].as_str().unwrap_or_default();
        Ok(json!({"file_path": path, "content": "buy oat milk"}))
    }
}

#[tokio::test]
async fn test_text_query_sends_directives_and_books_cost() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", GENERATE_PATH)
        .match_header("x-goog-api-key", API_KEY)
        .match_header("user-agent", Matcher::Regex(r"^ai-conductor/\S+ \(.+\)$".into()))
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": {"temperature": 0.7, "topP": 0.8, "topK": 40, "maxOutputTokens": 2048}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_body("Hi there!", 1000, 1500).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = fixture.client();
    let turn = client
        .query(
            &[Message::user("hello")],
            &["You are terse.".to_string()],
            &ToolSet::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(turn.text(), "Hi there!");
    assert!(!turn.is_api_error_message);
    assert_eq!(turn.message.usage.prompt_tokens, 1000);
    assert_eq!(turn.message.usage.completion_tokens, 500);
    assert!((turn.cost_usd - 0.0005).abs() < 1e-12);
    assert_eq!(client.ledger().totals().calls, 1);

    let wire = serde_json::to_value(&turn).unwrap();
    assert_eq!(wire["message"]["type"], "message");
    assert!(wire["costUSD"].is_number());
    assert!(wire["durationMs"].is_number());
}

#[tokio::test]
async fn test_function_call_runs_tool_and_one_follow_up() {
    let mut fixture = MockServerFixture::new().await;
    let first = fixture
        .mock_json(
            200,
            function_call_body("memory_read", json!({"file_path": "todo.md"})),
            1,
        )
        .await;
    let second = fixture
        .server
        .mock("POST", GENERATE_PATH)
        .match_body(Matcher::Regex("buy oat milk".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(text_body("Your todo: buy oat milk", 40, 50).to_string())
        .expect(1)
        .create_async()
        .await;

    let tool = Arc::new(MemoryRead {
        calls: AtomicUsize::new(0),
    });
    let tools = ToolSet::from_tools(vec![tool.clone() as Arc<dyn Tool>]);
    let client = fixture.client();
    let turn = client
        .query(
            &[Message::user("what's on my todo list?")],
            &[],
            &tools,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(tool.calls.load(Ordering::SeqCst), 1);
    assert_eq!(turn.text(), "Your todo: buy oat milk");
    assert_eq!(turn.message.usage.total_tokens, 80);
    assert_eq!(turn.tools.names(), vec!["memory_read"]);
}

#[tokio::test]
async fn test_unknown_function_call_keeps_original_answer() {
    let mut fixture = MockServerFixture::new().await;
    let only = fixture
        .mock_json(200, function_call_body("web_search", json!({"q": "x"})), 1)
        .await;

    let tools = ToolSet::from_tools(vec![Arc::new(MemoryRead {
        calls: AtomicUsize::new(0),
    }) as Arc<dyn Tool>]);
    let turn = fixture
        .client()
        .query(&[Message::user("search")], &[], &tools, &CancellationToken::new())
        .await
        .unwrap();

    only.assert_async().await;
    assert_eq!(turn.text(), "(no content)");
    assert!(!turn.is_api_error_message);
}

#[tokio::test]
async fn test_unavailable_is_retried_then_succeeds() {
    let mut fixture = MockServerFixture::new().await;
    let failing = fixture
        .mock_json(503, error_body(503, "UNAVAILABLE", "The model is overloaded."), 2)
        .await;
    let ok = fixture.mock_json(200, text_body("finally", 5, 7), 1).await;

    let turn = fixture
        .client()
        .query(&[Message::user("hi")], &[], &ToolSet::new(), &CancellationToken::new())
        .await
        .unwrap();

    failing.assert_async().await;
    ok.assert_async().await;
    assert_eq!(turn.text(), "finally");
}

#[tokio::test]
async fn test_exhausted_retries_become_error_turn() {
    let mut fixture = MockServerFixture::new().await;
    let failing = fixture
        .mock_json(429, error_body(429, "RESOURCE_EXHAUSTED", "Quota exceeded."), 3)
        .await;

    let client = fixture
        .builder()
        .retry_policy(
            ai_conductor::RetryPolicy::default()
                .with_base_delay(std::time::Duration::from_millis(1))
                .with_max_retries(2),
        )
        .build()
        .unwrap();
    let turn = client
        .query(&[Message::user("hi")], &[], &ToolSet::new(), &CancellationToken::new())
        .await
        .unwrap();

    failing.assert_async().await;
    assert!(turn.is_api_error_message);
    assert_eq!(turn.text(), "API Error: Quota exceeded. [RESOURCE_EXHAUSTED]");
    assert_eq!(client.ledger().totals().calls, 0);
}

#[tokio::test]
async fn test_fatal_error_is_not_retried() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json(
            400,
            error_body(400, "INVALID_ARGUMENT", "* GenerateContentRequest.contents: contents is not specified"),
            1,
        )
        .await;

    let turn = fixture
        .client()
        .query(&[], &[], &ToolSet::new(), &CancellationToken::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(turn.is_api_error_message);
    assert!(turn.text().starts_with("API Error: "));
}

#[tokio::test]
async fn test_invalid_key_turn_and_verification() {
    let mut fixture = MockServerFixture::new().await;
    let body = json!({"error": {
        "code": 400,
        "message": "API key not valid. Please pass a valid API key.",
        "status": "INVALID_ARGUMENT",
        "details": [{
            "@type": "type.googleapis.com/google.rpc.ErrorInfo",
            "reason": "API_KEY_INVALID",
            "domain": "googleapis.com"
        }]
    }});
    let mock = fixture.mock_json(400, body, 2).await;

    let client = fixture.client();
    let turn = client
        .query(&[Message::user("hi")], &[], &ToolSet::new(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(turn.text(), INVALID_API_KEY_ERROR_MESSAGE);
    assert!(!client.verify_api_key().await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_verify_api_key_accepts_working_key() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", GENERATE_PATH)
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"role": "user", "parts": [{"text": "test"}]}]
        })))
        .with_status(200)
        .with_body(text_body("ok", 1, 2).to_string())
        .expect(1)
        .create_async()
        .await;

    assert!(fixture.client().verify_api_key().await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_blank_api_key_fails_before_network() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json(200, text_body("unused", 1, 1), 0).await;

    let err = fixture
        .builder()
        .config(ai_conductor::ClientConfig::new("   "))
        .api_key("")
        .build()
        .unwrap_err();

    assert!(matches!(err, ai_conductor::Error::Configuration { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_aborts_slow_request() {
    let mut fixture = MockServerFixture::new().await;
    let body = text_body("too late", 1, 2).to_string();
    let _mock = fixture
        .server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(move |w| {
            std::thread::sleep(std::time::Duration::from_secs(2));
            w.write_all(body.as_bytes())
        })
        .create_async()
        .await;

    let client = fixture.client();
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = client
        .query(&[Message::user("hi")], &[], &ToolSet::new(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, ai_conductor::Error::Cancelled));
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
    assert_eq!(client.ledger().totals().calls, 0);
}
