use thiserror::Error;

use crate::core::composer::AssemblyError;

/// Failures a run can hit. Only the run boundary in `core::runtime` logs them;
/// everything below propagates with `?`.
#[derive(Debug, Error)]
pub enum BotError {
    /// Candidate feed unreachable or unreadable. Sources swallow this into an
    /// empty candidate list, so it never ends a run on its own.
    #[error("candidate fetch failed: {0}")]
    Fetch(String),

    #[error("text generation failed: {0}")]
    Generation(String),

    /// The AI answer did not contain a usable record. `raw` is kept verbatim
    /// for diagnostics.
    #[error("could not parse AI response: {reason}")]
    Parse { reason: String, raw: String },

    #[error("payload assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("image generation failed: {0}")]
    Image(String),

    #[error("publish rejected with status {status}: {body}")]
    Publish { status: u16, body: String },

    #[error("publish request failed before a response arrived: {0}")]
    PublishTransport(String),

    #[error("history update failed: {0}")]
    History(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub fn parse(reason: impl Into<String>, raw: &str) -> Self {
        BotError::Parse {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
