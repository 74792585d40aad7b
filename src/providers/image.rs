//! Image generation over HTTP and normalisation of whatever comes back into a
//! local file the publisher can upload.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{BotError, Result};
use crate::models::MediaFile;
use crate::providers::ImageGenerator;

/// The shapes image endpoints answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawImage {
    Binary(Bytes),
    Url(String),
    Base64(String),
}

impl RawImage {
    /// Classifies a textual answer: bare string, JSON string, `{"data": [...]}`
    /// envelope (gradio style) or an object carrying `url`/`image`/`b64_json`.
    pub fn from_text(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Self::from_json(&value)
                .ok_or_else(|| BotError::Image(format!("no image in response: {}", preview(trimmed))));
        }
        Self::from_str_value(trimmed.trim_matches('"'))
            .ok_or_else(|| BotError::Image("empty image response".to_string()))
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::from_str_value(s),
            Value::Array(items) => items.iter().find_map(Self::from_json),
            Value::Object(map) => ["data", "images", "output", "url", "image", "b64_json", "path"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(Self::from_json),
            _ => None,
        }
    }

    fn from_str_value(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Some(RawImage::Url(s.to_string()));
        }
        if let Some(rest) = s.strip_prefix("data:") {
            let (_, payload) = rest.split_once(',')?;
            return Some(RawImage::Base64(payload.to_string()));
        }
        Some(RawImage::Base64(s.to_string()))
    }
}

/// Posts `{"data": [prompt]}` to a prediction endpoint such as a Hugging Face
/// Space's `/api/predict`.
pub struct HttpImageGenerator {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpImageGenerator {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token,
        }
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<RawImage> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "data": [prompt] }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BotError::Image(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Image(format!("{status}: {}", preview(&body))));
        }

        let is_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("image/"));
        if is_image {
            let bytes = response.bytes().await.map_err(|e| BotError::Image(e.to_string()))?;
            return Ok(RawImage::Binary(bytes));
        }

        let text = response.text().await.map_err(|e| BotError::Image(e.to_string()))?;
        RawImage::from_text(&text)
    }
}

/// Writes generated images into a scratch directory.
pub struct MediaStore {
    client: reqwest::Client,
    dir: PathBuf,
}

impl MediaStore {
    pub fn new(client: reqwest::Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, raw: RawImage, stem: &str) -> Result<MediaFile> {
        let bytes = match raw {
            RawImage::Binary(bytes) => bytes,
            RawImage::Url(url) => self.download(&url).await?,
            RawImage::Base64(encoded) => {
                let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
                Bytes::from(
                    STANDARD
                        .decode(compact.as_bytes())
                        .map_err(|e| BotError::Image(format!("invalid base64 image: {e}")))?,
                )
            }
        };

        let (extension, mime) = sniff_format(&bytes)
            .ok_or_else(|| BotError::Image("unrecognised image format".to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BotError::Image(e.to_string()))?;
        let path = self.dir.join(format!("{stem}.{extension}"));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| BotError::Image(format!("writing {}: {e}", path.display())))?;

        info!(path = %path.display(), bytes = bytes.len(), mime, "image saved");
        Ok(MediaFile { path, mime })
    }

    pub async fn discard(&self, media: &MediaFile) {
        if let Err(e) = tokio::fs::remove_file(&media.path).await {
            debug!(path = %media.path.display(), error = %e, "could not remove temporary image");
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BotError::Image(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Image(format!("downloading {url}: {status}")));
        }
        response.bytes().await.map_err(|e| BotError::Image(e.to_string()))
    }
}

/// Extension and mime type from magic bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<(&'static str, &'static str)> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(("png", "image/png"))
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(("jpg", "image/jpeg"))
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(("gif", "image/gif"))
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(("webp", "image/webp"))
    } else {
        None
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
