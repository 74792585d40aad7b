use tracing::debug;

use crate::core::instruction_builder::InstructionBuilder;
use crate::error::Result;
use crate::models::CandidateItem;
use crate::providers::TextGenerator;

/// Sends prompts to the configured text generator and hands back the raw
/// answer untouched. Decoding is the parser's job.
pub struct Agent {
    generator: Box<dyn TextGenerator>,
    instructions: InstructionBuilder,
}

impl Agent {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator,
            instructions: InstructionBuilder::new(),
        }
    }

    pub fn instructions(&self) -> &InstructionBuilder {
        &self.instructions
    }

    pub fn provider_name(&self) -> &'static str {
        self.generator.name()
    }

    pub async fn request_trend_words(&self) -> Result<String> {
        self.ask("trend_words", &self.instructions.trend_words()).await
    }

    pub async fn request_news_post(
        &self,
        candidates: &[CandidateItem],
        trend_words: &[String],
    ) -> Result<String> {
        let prompt = self.instructions.news_post(candidates, trend_words);
        self.ask("news_post", &prompt).await
    }

    pub async fn request_hashtags(&self, word: &str) -> Result<String> {
        self.ask("hashtags", &self.instructions.hashtags(word)).await
    }

    async fn ask(&self, purpose: &str, prompt: &str) -> Result<String> {
        debug!(provider = self.generator.name(), purpose, prompt_chars = prompt.chars().count(), "prompting");
        let raw = self.generator.generate(prompt).await?;
        debug!(provider = self.generator.name(), purpose, response_chars = raw.chars().count(), "response received");
        Ok(raw)
    }
}
