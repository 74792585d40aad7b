use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest_oauth1::{OAuthClientProvider, Secrets};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::{BotError, Result};
use crate::models::{MediaFile, PostId, PostPayload};
use crate::providers::Publisher;

pub const API_BASE: &str = "https://api.twitter.com";
pub const UPLOAD_BASE: &str = "https://upload.twitter.com";

/// OAuth 1.0a user-context keys.
#[derive(Clone, Debug)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MediaResponse {
    media_id_string: String,
}

pub struct Twitter {
    client: reqwest::Client,
    credentials: TwitterCredentials,
    api_base: String,
    upload_base: String,
}

impl Twitter {
    pub fn new(client: reqwest::Client, credentials: TwitterCredentials) -> Self {
        Twitter {
            client,
            credentials,
            api_base: API_BASE.to_string(),
            upload_base: UPLOAD_BASE.to_string(),
        }
    }

    /// Points both the API and the upload host at `base`.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        self.api_base = base.clone();
        self.upload_base = base;
        self
    }

    fn secrets(&self) -> Secrets<'_> {
        Secrets::new(
            self.credentials.consumer_key.as_str(),
            self.credentials.consumer_secret.as_str(),
        )
        .token(
            self.credentials.access_token.as_str(),
            self.credentials.access_token_secret.as_str(),
        )
    }

    /// v1.1 simple upload with a base64 `media_data` field; returns the media id.
    pub async fn upload_media(&self, media: &MediaFile) -> Result<String> {
        let bytes = tokio::fs::read(&media.path)
            .await
            .map_err(|e| BotError::Image(format!("reading {}: {e}", media.path.display())))?;
        let encoded = STANDARD.encode(&bytes);

        let response = self
            .client
            .clone()
            .oauth1(self.secrets())
            .post(format!("{}/1.1/media/upload.json", self.upload_base))
            .form(&[("media_data", encoded.as_str())])
            .send()
            .await
            .map_err(|e| BotError::PublishTransport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BotError::PublishTransport(e.to_string()))?;
        if !status.is_success() {
            return Err(BotError::Publish {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MediaResponse = serde_json::from_str(&body).map_err(|e| BotError::Publish {
            status: status.as_u16(),
            body: format!("unreadable media response ({e}): {body}"),
        })?;
        info!(media_id = %parsed.media_id_string, mime = media.mime, "media uploaded");
        Ok(parsed.media_id_string)
    }

    pub async fn tweet(&self, text: &str, media_ids: &[String]) -> Result<PostId> {
        let mut body = json!({ "text": text });
        if !media_ids.is_empty() {
            body["media"] = json!({ "media_ids": media_ids });
        }

        let response = self
            .client
            .clone()
            .oauth1(self.secrets())
            .post(format!("{}/2/tweets", self.api_base))
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| BotError::PublishTransport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BotError::PublishTransport(e.to_string()))?;
        if !status.is_success() {
            error!(status = status.as_u16(), body = %text, "tweet rejected");
            return Err(BotError::Publish {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: TweetResponse = serde_json::from_str(&text).map_err(|e| BotError::Publish {
            status: status.as_u16(),
            body: format!("unreadable tweet response ({e}): {text}"),
        })?;
        Ok(PostId(parsed.data.id))
    }
}

#[async_trait]
impl Publisher for Twitter {
    async fn publish(&self, payload: &PostPayload, media: Option<&MediaFile>) -> Result<PostId> {
        let mut media_ids = Vec::new();
        if let Some(media) = media {
            media_ids.push(self.upload_media(media).await?);
        }
        let post_id = self.tweet(&payload.text, &media_ids).await?;
        info!(%post_id, chars = payload.weighted_len, "tweet posted");
        Ok(post_id)
    }
}
