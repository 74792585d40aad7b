//! Turns free-form AI answers into typed records.
//!
//! Models like to wrap JSON in prose or code fences, so every decoder here
//! slices from the first opening delimiter to the last closing one before
//! handing the span to serde.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{BotError, Result};
use crate::models::GeneratedContent;

pub const MAX_HASHTAGS: usize = 10;

/// Models mix key names, sometimes in one record, so each alias is its own
/// field and the first non-empty one wins.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    selected_url: Option<String>,
    #[serde(default)]
    selected_id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    hashtags: Option<HashtagField>,
}

fn first_filled(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HashtagField {
    List(Vec<String>),
    Joined(String),
}

/// First `open` through last `close`, inclusive. `None` when either is
/// missing or they are out of order.
pub fn outer_span(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&raw[start..end + close.len_utf8()])
}

pub fn parse_generated_content(raw: &str) -> Result<GeneratedContent> {
    let span = outer_span(raw, '{', '}')
        .ok_or_else(|| BotError::parse("no braced record in response", raw))?;

    let record: RawRecord = serde_json::from_str(span)
        .map_err(|e| BotError::parse(format!("record is not valid JSON: {e}"), raw))?;

    let selected_id = first_filled([record.selected_url, record.selected_id, record.url])
        .ok_or_else(|| BotError::parse("missing selected_url", raw))?;

    let body_text = first_filled([record.text, record.summary, record.body])
        .ok_or_else(|| BotError::parse("missing or empty text", raw))?;

    let hashtags = match record.hashtags {
        Some(HashtagField::List(tags)) => normalize_hashtags(tags.iter().map(String::as_str)),
        Some(HashtagField::Joined(joined)) => normalize_hashtags(joined.split_whitespace()),
        None => Vec::new(),
    };

    Ok(GeneratedContent {
        selected_id,
        body_text,
        hashtags,
    })
}

/// Decodes a JSON array of strings such as `["ワード1", "ワード2"]`.
pub fn parse_string_array(raw: &str) -> Result<Vec<String>> {
    let span = outer_span(raw, '[', ']')
        .ok_or_else(|| BotError::parse("no bracketed list in response", raw))?;

    let words: Vec<String> = serde_json::from_str(span)
        .map_err(|e| BotError::parse(format!("list is not a JSON string array: {e}"), raw))?;

    Ok(words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect())
}

/// One hashtag per line, as the hashtag prompt asks for. List markers are
/// stripped and bare words get a `#`. Prose lines (a lead-in ending in a
/// colon, or several words without a leading `#`) are skipped.
pub fn parse_hashtag_lines(raw: &str) -> Vec<String> {
    static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*(?:[-*・•]|\d+[.)．])\s*").expect("static regex")
    });
    let tags = raw
        .lines()
        .map(|line| match LIST_MARKER.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            line.starts_with(['#', '＃'])
                || (!line.ends_with([':', '：']) && line.split_whitespace().count() == 1)
        });
    normalize_hashtags(tags)
}

fn normalize_hashtags<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let body = tag.trim().trim_start_matches(['#', '＃']);
        // Hashtags end at the first whitespace on every platform we post to.
        let body = body.split_whitespace().next().unwrap_or_default();
        if body.is_empty() {
            continue;
        }
        let tag = format!("#{body}");
        if !out.contains(&tag) {
            out.push(tag);
        }
        if out.len() == MAX_HASHTAGS {
            break;
        }
    }
    out
}
