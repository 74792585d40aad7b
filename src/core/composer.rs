//! Builds the post text under the platform's length budget.
//!
//! Layout is `body \n hashtags \n link`, skipping empty parts. When the whole
//! thing does not fit, trailing hashtags are dropped only as far as needed to
//! leave room for some body text, then the body is shortened. The link is
//! never touched.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::PostPayload;

pub const ELLIPSIS: &str = "…";

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+").expect("static regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostLimits {
    pub max_chars: usize,
    /// What every link counts as, whatever its real length.
    pub link_cost: usize,
    /// Count characters outside Latin and common punctuation ranges as two,
    /// the way X weights CJK text.
    pub weighted_cjk: bool,
}

impl Default for PostLimits {
    fn default() -> Self {
        Self {
            max_chars: 280,
            link_cost: 23,
            weighted_cjk: true,
        }
    }
}

impl PostLimits {
    pub fn char_weight(&self, c: char) -> usize {
        if !self.weighted_cjk {
            return 1;
        }
        match c as u32 {
            0..=4351 | 8192..=8205 | 8208..=8223 | 8242..=8247 => 1,
            _ => 2,
        }
    }

    pub fn weighted_len(&self, text: &str) -> usize {
        let mut total = 0;
        let mut last = 0;
        for link in URL.find_iter(text) {
            total += self.plain_len(&text[last..link.start()]) + self.link_cost;
            last = link.end();
        }
        total + self.plain_len(&text[last..])
    }

    fn plain_len(&self, text: &str) -> usize {
        text.chars().map(|c| self.char_weight(c)).sum()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("body text is empty")]
    EmptyBody,
    #[error("link costs {cost} characters but the limit is {max}")]
    LinkTooLong { cost: usize, max: usize },
    #[error("no room for any body text within {max} characters")]
    NoRoomForBody { max: usize },
}

pub struct PayloadAssembler {
    limits: PostLimits,
}

impl PayloadAssembler {
    pub fn new(limits: PostLimits) -> Self {
        Self { limits }
    }

    pub fn assemble(
        &self,
        body: &str,
        hashtags: &[String],
        link: Option<&str>,
    ) -> Result<PostPayload, AssemblyError> {
        let max = self.limits.max_chars;
        let body = body.trim();
        if body.is_empty() {
            return Err(AssemblyError::EmptyBody);
        }

        let link = link.map(str::trim).filter(|l| !l.is_empty());
        if let Some(link) = link {
            let cost = self.limits.weighted_len(link);
            if cost > max {
                return Err(AssemblyError::LinkTooLong { cost, max });
            }
        }

        let mut tags: Vec<&str> = hashtags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();

        let full = compose(body, &tags, link);
        if self.fits(&full) {
            return Ok(self.payload(full, false, Vec::new()));
        }

        let shortest = shortest_body(body);
        let mut dropped = Vec::new();
        while !self.fits(&compose(&shortest, &tags, link)) {
            match tags.pop() {
                Some(tag) => dropped.insert(0, tag.to_string()),
                None => return Err(AssemblyError::NoRoomForBody { max }),
            }
        }
        if !dropped.is_empty() {
            warn!(dropped = ?dropped, max, "hashtags dropped to fit the post limit");
        }

        let text = compose(body, &tags, link);
        if self.fits(&text) {
            return Ok(self.payload(text, false, dropped));
        }

        let shortened = self.shorten_body(body, &tags, link);
        debug!(
            original_chars = body.chars().count(),
            kept_chars = shortened.chars().count(),
            "body truncated"
        );
        Ok(self.payload(compose(&shortened, &tags, link), true, dropped))
    }

    fn fits(&self, text: &str) -> bool {
        self.limits.weighted_len(text) <= self.limits.max_chars
    }

    /// Longest body prefix (plus ellipsis) that fits next to `tags` and
    /// `link`. Callers guarantee the one-character prefix fits.
    fn shorten_body(&self, body: &str, tags: &[&str], link: Option<&str>) -> String {
        let fits_at = |end: usize| self.fits(&compose(&with_ellipsis(&body[..end]), tags, link));

        // Byte offsets that end a prefix of 1..n-1 characters.
        let ends: Vec<usize> = body.char_indices().map(|(i, _)| i).skip(1).collect();
        if ends.is_empty() {
            return body.to_string();
        }

        // Link tokens make the weight non-monotonic in rare cases, so walk
        // down from the binary-search result until something fits.
        let mut idx = ends.partition_point(|&end| fits_at(end)).max(1);
        while idx > 1 && !fits_at(ends[idx - 1]) {
            idx -= 1;
        }
        let prefix = &body[..ends[idx - 1]];

        if let Some(space) = prefix.rfind(char::is_whitespace) {
            let before = prefix[..space].trim_end();
            let in_second_half = before.chars().count() * 2 >= prefix.chars().count();
            if in_second_half && !before.is_empty() && fits_at(before.len()) {
                return with_ellipsis(before);
            }
        }
        with_ellipsis(prefix)
    }

    fn payload(&self, text: String, truncated: bool, dropped_hashtags: Vec<String>) -> PostPayload {
        PostPayload {
            weighted_len: self.limits.weighted_len(&text),
            text,
            truncated,
            dropped_hashtags,
        }
    }
}

fn compose(body: &str, tags: &[&str], link: Option<&str>) -> String {
    let joined = tags.join(" ");
    let mut parts: Vec<&str> = Vec::with_capacity(3);
    if !body.is_empty() {
        parts.push(body);
    }
    if !joined.is_empty() {
        parts.push(&joined);
    }
    if let Some(link) = link {
        parts.push(link);
    }
    parts.join("\n")
}

fn shortest_body(body: &str) -> String {
    let mut chars = body.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(_)) => format!("{first}{ELLIPSIS}"),
        _ => body.to_string(),
    }
}

fn with_ellipsis(prefix: &str) -> String {
    format!("{}{ELLIPSIS}", prefix.trim_end())
}
