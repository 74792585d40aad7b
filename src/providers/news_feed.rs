use async_trait::async_trait;
use feed_rs::parser;
use tracing::{info, warn};

use crate::error::{BotError, Result};
use crate::models::CandidateItem;
use crate::providers::CandidateSource;

pub const DEFAULT_RSS_URL: &str = "https://www3.nhk.or.jp/rss/news/cat0.xml";

/// RSS/Atom headlines. Each entry's first link becomes the candidate id.
pub struct NewsFeed {
    client: reqwest::Client,
    url: String,
}

impl NewsFeed {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn try_fetch(&self, limit: usize) -> Result<Vec<CandidateItem>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BotError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Fetch(format!("{} returned {}", self.url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BotError::Fetch(e.to_string()))?;
        parse_entries(&body, limit)
    }
}

pub fn parse_entries(content: &[u8], limit: usize) -> Result<Vec<CandidateItem>> {
    let feed = parser::parse(content).map_err(|e| BotError::Fetch(format!("feed parse error: {e}")))?;

    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let id = entry.links.first()?.href.trim().to_string();
            if id.is_empty() {
                return None;
            }
            Some(CandidateItem {
                id,
                title: entry.title.map(|t| t.content.trim().to_string()).unwrap_or_default(),
                summary: entry.summary.map(|s| s.content.trim().to_string()).unwrap_or_default(),
            })
        })
        .take(limit)
        .collect())
}

#[async_trait]
impl CandidateSource for NewsFeed {
    fn name(&self) -> &'static str {
        "news_feed"
    }

    async fn fetch(&self, limit: usize) -> Vec<CandidateItem> {
        match self.try_fetch(limit).await {
            Ok(items) => {
                info!(url = %self.url, count = items.len(), "feed fetched");
                items
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "feed unavailable, continuing with no candidates");
                Vec::new()
            }
        }
    }
}
