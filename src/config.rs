use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::composer::PostLimits;
use crate::error::{BotError, Result};
use crate::providers::gemini;
use crate::providers::news_feed::DEFAULT_RSS_URL;
use crate::providers::twitter::TwitterCredentials;

pub const DEFAULT_HISTORY_FILE: &str = "sent_news.json";
pub const DEFAULT_FEED_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextProvider {
    Gemini,
    Anthropic,
}

impl FromStr for TextProvider {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(TextProvider::Gemini),
            "anthropic" | "claude" => Ok(TextProvider::Anthropic),
            other => Err(BotError::Config(format!("unsupported TEXT_PROVIDER: {other}"))),
        }
    }
}

/// Everything a run needs, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub text_provider: TextProvider,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,
    pub twitter: Option<TwitterCredentials>,
    pub rss_url: String,
    pub feed_limit: usize,
    pub history_file: PathBuf,
    pub image_api_url: Option<String>,
    pub image_api_token: Option<String>,
    pub media_dir: PathBuf,
    pub limits: PostLimits,
    pub http_timeout: Duration,
    /// Build and log the post without publishing or touching history.
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let text_provider = match get("TEXT_PROVIDER") {
            Some(value) => value.parse()?,
            None => TextProvider::Gemini,
        };

        let twitter = match (
            get("X_API_KEY"),
            get("X_API_SECRET"),
            get("X_ACCESS_TOKEN"),
            get("X_ACCESS_TOKEN_SECRET"),
        ) {
            (Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_token_secret)) => {
                Some(TwitterCredentials {
                    consumer_key,
                    consumer_secret,
                    access_token,
                    access_token_secret,
                })
            }
            _ => None,
        };

        let defaults = PostLimits::default();
        let limits = PostLimits {
            max_chars: parse_number(&get, "POST_MAX_CHARS", defaults.max_chars)?,
            link_cost: parse_number(&get, "POST_LINK_COST", defaults.link_cost)?,
            weighted_cjk: parse_flag(&get, "POST_WEIGHTED_CJK", defaults.weighted_cjk)?,
        };

        Ok(Config {
            text_provider,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            anthropic_model: get("ANTHROPIC_MODEL"),
            twitter,
            rss_url: get("RSS_URL").unwrap_or_else(|| DEFAULT_RSS_URL.to_string()),
            feed_limit: parse_number(&get, "FEED_LIMIT", DEFAULT_FEED_LIMIT)?,
            history_file: get("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE)),
            image_api_url: get("IMAGE_API_URL"),
            image_api_token: get("IMAGE_API_TOKEN"),
            media_dir: get("MEDIA_DIR").map(PathBuf::from).unwrap_or_else(env::temp_dir),
            limits,
            http_timeout: Duration::from_secs(parse_number(&get, "HTTP_TIMEOUT_SECS", 60)?),
            dry_run: parse_flag(&get, "DRY_RUN", false)?,
        })
    }

    /// Checks that the credentials the chosen collaborators need are present.
    pub fn validate(&self) -> Result<()> {
        match self.text_provider {
            TextProvider::Gemini if self.gemini_api_key.is_none() => {
                return Err(BotError::Config("GEMINI_API_KEY is not set".to_string()));
            }
            TextProvider::Anthropic if self.anthropic_api_key.is_none() => {
                return Err(BotError::Config("ANTHROPIC_API_KEY is not set".to_string()));
            }
            _ => {}
        }
        if !self.dry_run && self.twitter.is_none() {
            return Err(BotError::Config(
                "X_API_KEY, X_API_SECRET, X_ACCESS_TOKEN and X_ACCESS_TOKEN_SECRET are required unless running dry".to_string(),
            ));
        }
        if self.limits.max_chars == 0 {
            return Err(BotError::Config("POST_MAX_CHARS must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_number<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| BotError::Config(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(BotError::Config(format!("{key} must be a boolean, got {v:?}"))),
    }
}
