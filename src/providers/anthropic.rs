use async_trait::async_trait;
use rig::agent::Agent as RigAgent;
use rig::completion::Prompt;
use rig::providers::anthropic::completion::CompletionModel;
use rig::providers::anthropic::{self, CLAUDE_3_HAIKU};

use crate::error::{BotError, Result};
use crate::providers::TextGenerator;

const PREAMBLE: &str = "You write short, punchy Japanese social media posts. \
    Follow the requested output format exactly and never add commentary around it.";

/// Claude through rig's agent API.
pub struct Anthropic {
    agent: RigAgent<CompletionModel>,
}

impl Anthropic {
    pub fn new(api_key: &str, model: Option<&str>) -> Self {
        let client = anthropic::ClientBuilder::new(api_key).build();
        let agent = client
            .agent(model.unwrap_or(CLAUDE_3_HAIKU))
            .preamble(PREAMBLE)
            .temperature(0.9)
            .max_tokens(4096)
            .build();
        Anthropic { agent }
    }
}

#[async_trait]
impl TextGenerator for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.agent
            .prompt(prompt)
            .await
            .map_err(|e| BotError::Generation(e.to_string()))
    }
}
