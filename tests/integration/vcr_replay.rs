//! Record against the mock server, then replay with no network at all.

use crate::mock_server::*;
use ai_conductor::tokens::CostLedger;
use ai_conductor::vcr::{Cassette, FileCassette, FingerprintGenerator};
use ai_conductor::{ConversationRecorder, GeminiClient, Message, ToolSet, VcrMode};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn conversation() -> Vec<Message> {
    vec![
        Message::user("What is 2 + 2?"),
        Message::assistant("4"),
        Message::user("And doubled?"),
    ]
}

#[tokio::test]
async fn test_replay_matches_recording_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let mut fixture = MockServerFixture::new().await;
    let live = fixture.mock_json(200, text_body("8", 12, 13), 1).await;

    let recording = fixture
        .builder()
        .recorder(ConversationRecorder::with_dir(VcrMode::Record, dir.path()))
        .build()
        .unwrap();
    let system = vec!["Answer with a number.".to_string()];
    let recorded = recording
        .query(&conversation(), &system, &ToolSet::new(), &CancellationToken::new())
        .await
        .unwrap();
    live.assert_async().await;
    assert_eq!(recording.recorder().stats().recorded, 1);

    let cassette = FileCassette::new(dir.path());
    assert_eq!(cassette.len().await.unwrap(), 1);

    // Unroutable base URL: any network attempt would fail the call.
    let replaying = GeminiClient::builder()
        .api_key(API_KEY)
        .model(MODEL)
        .base_url("http://127.0.0.1:9")
        .ledger(Arc::new(CostLedger::new()))
        .recorder(ConversationRecorder::with_dir(VcrMode::Replay, dir.path()))
        .build()
        .unwrap();
    let replayed = replaying
        .query(&conversation(), &system, &ToolSet::new(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(!replayed.is_api_error_message);
    assert_eq!(replayed.message.content, recorded.message.content);
    assert_eq!(replayed.message.usage, recorded.message.usage);
    assert_eq!(replayed.cost_usd, recorded.cost_usd);
    assert_eq!(replaying.recorder().stats().replayed, 1);
}

#[tokio::test]
async fn test_replayed_response_bytes_equal_recorded_response() {
    let dir = tempfile::tempdir().unwrap();
    let mut fixture = MockServerFixture::new().await;
    let body = text_body("stored", 3, 4);
    fixture.mock_json(200, body.clone(), 1).await;

    let client = fixture
        .builder()
        .recorder(ConversationRecorder::with_dir(VcrMode::Record, dir.path()))
        .build()
        .unwrap();
    client.generate_text("persist").await.unwrap();

    let request = client.driver().prompt_request("persist");
    let fingerprint = FingerprintGenerator::new().generate(MODEL, &request).unwrap();
    let stored = FileCassette::new(dir.path())
        .load(&fingerprint)
        .await
        .unwrap()
        .expect("interaction recorded under the request fingerprint");
    assert_eq!(
        serde_json::to_vec(&stored.response).unwrap(),
        serde_json::to_vec(&body).unwrap()
    );
}

#[tokio::test]
async fn test_replay_miss_surfaces_as_error_turn() {
    let dir = tempfile::tempdir().unwrap();
    let client = GeminiClient::builder()
        .api_key(API_KEY)
        .base_url("http://127.0.0.1:9")
        .ledger(Arc::new(CostLedger::new()))
        .recorder(ConversationRecorder::with_dir(VcrMode::Replay, dir.path()))
        .build()
        .unwrap();
    let turn = client
        .query(&conversation(), &[], &ToolSet::new(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(turn.is_api_error_message);
    assert!(turn.text().contains("no recorded interaction"));
}
