use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::BotError;

/// A word or news item eligible for posting.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CandidateItem {
    /// Stable identifier; the article link for news items, the word itself for vocabulary picks.
    pub id: String,
    pub title: String,
    pub summary: String,
}

/// Structured record decoded from an AI answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedContent {
    pub selected_id: String,
    pub body_text: String,
    pub hashtags: Vec<String>,
}

/// Final text handed to the publisher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostPayload {
    pub text: String,
    /// Length as the platform counts it (links at a fixed cost).
    pub weighted_len: usize,
    pub truncated: bool,
    /// Hashtags removed from the end to make room for the body.
    pub dropped_hashtags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostId(pub String);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An image normalised to a local file, ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub mime: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Filtering,
    Requesting,
    Parsing,
    Assembling,
    Publishing,
    Done,
    Failed,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Posted { post_id: PostId, payload: PostPayload },
    /// Every candidate was already in the history.
    NothingNew,
    /// Publishing disabled; the payload was built and logged only.
    DryRun { payload: PostPayload },
}

#[derive(Debug)]
pub struct RunReport {
    /// `Done` or `Failed`.
    pub state: RunState,
    /// The step the run was in when it ended.
    pub last_step: RunState,
    pub outcome: Result<Outcome, BotError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn exit_code(&self) -> u8 {
        match self.state {
            RunState::Done => 0,
            _ => 1,
        }
    }
}
