// src/providers/tests/gemini_tests.rs

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::super::gemini::Gemini;
use super::super::TextGenerator;
use crate::error::BotError;

fn gemini(server: &MockServer) -> Gemini {
    Gemini::new(reqwest::Client::new(), "test-key", "gemini-test").with_base_url(server.uri())
}

#[tokio::test]
async fn test_generate_joins_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "こんにちは" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"selected_url\": " }, { "text": "\"u\"}\n" }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = gemini(&server).generate("こんにちは").await.unwrap();
    assert_eq!(text, "{\"selected_url\": \"u\"}\n", "answer is passed through untouched");
}

#[tokio::test]
async fn test_generate_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    match gemini(&server).generate("hi").await {
        Err(BotError::Generation(message)) => {
            assert!(message.contains("429"));
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("expected generation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_without_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    assert!(matches!(
        gemini(&server).generate("hi").await,
        Err(BotError::Generation(_))
    ));
}
