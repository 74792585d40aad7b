pub mod anthropic;
pub mod gemini;
pub mod image;
pub mod news_feed;
pub mod twitter;
pub mod vocabulary;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CandidateItem, MediaFile, PostId, PostPayload};

pub use image::RawImage;

/// Produces posting candidates. Fetch problems are logged by the source and
/// surface as an empty list, which the run treats as "nothing to do".
#[async_trait]
pub trait CandidateSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self, limit: usize) -> Vec<CandidateItem>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<RawImage>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, payload: &PostPayload, media: Option<&MediaFile>) -> Result<PostId>;
}

#[cfg(test)]
mod tests;
