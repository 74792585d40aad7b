// src/providers/tests/twitter_tests.rs

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::super::twitter::{Twitter, TwitterCredentials};
use super::super::Publisher;
use crate::error::BotError;
use crate::models::{MediaFile, PostPayload};

fn twitter(server: &MockServer) -> Twitter {
    let credentials = TwitterCredentials {
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        access_token: "at".to_string(),
        access_token_secret: "ats".to_string(),
    };
    Twitter::new(reqwest::Client::new(), credentials).with_base_url(&server.uri())
}

fn payload(text: &str) -> PostPayload {
    PostPayload {
        text: text.to_string(),
        weighted_len: text.chars().count(),
        truncated: false,
        dropped_hashtags: vec![],
    }
}

#[tokio::test]
async fn test_publish_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header_exists("authorization"))
        .and(body_json(json!({ "text": "【速報】テスト\nhttps://example.com" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "1846000000000000001", "text": "【速報】テスト https://t.co/x" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let post_id = twitter(&server)
        .publish(&payload("【速報】テスト\nhttps://example.com"), None)
        .await
        .unwrap();
    assert_eq!(post_id.0, "1846000000000000001");
}

#[tokio::test]
async fn test_publish_rejected() {
    let server = MockServer::start().await;
    let detail = r#"{"title":"Forbidden","detail":"duplicate content","status":403}"#;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_string(detail))
        .mount(&server)
        .await;

    match twitter(&server).publish(&payload("hello"), None).await {
        Err(BotError::Publish { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, detail);
        }
        other => panic!("expected publish error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_publish_with_media() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/media/upload.json"))
        .and(body_string_contains("media_data="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "media_id": 710511363345354753u64,
            "media_id_string": "710511363345354753"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({
            "text": "生成単語: さくら",
            "media": { "media_ids": ["710511363345354753"] }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "42", "text": "生成単語: さくら" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("さくら.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
    let media = MediaFile {
        path: image,
        mime: "image/png",
    };

    let post_id = twitter(&server)
        .publish(&payload("生成単語: さくら"), Some(&media))
        .await
        .unwrap();
    assert_eq!(post_id.0, "42");
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let credentials = TwitterCredentials {
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        access_token: "at".to_string(),
        access_token_secret: "ats".to_string(),
    };
    let twitter = Twitter::new(reqwest::Client::new(), credentials).with_base_url("http://127.0.0.1:9");

    assert!(matches!(
        twitter.publish(&payload("hello"), None).await,
        Err(BotError::PublishTransport(_))
    ));
}
