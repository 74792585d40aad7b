use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::core::agent::Agent;
use crate::core::composer::PayloadAssembler;
use crate::core::parser;
use crate::error::{BotError, Result};
use crate::memory::HistoryStore;
use crate::models::{CandidateItem, MediaFile, Outcome, RunReport, RunState};
use crate::providers::image::MediaStore;
use crate::providers::{CandidateSource, ImageGenerator, Publisher};

/// One batch run: fetch, filter, generate, parse, assemble, publish.
pub struct Runtime<'a> {
    config: &'a Config,
    agent: Agent,
    publisher: Box<dyn Publisher>,
    assembler: PayloadAssembler,
    history: HistoryStore,
    images: Option<Box<dyn ImageGenerator>>,
    media: Option<MediaStore>,
    state: RunState,
}

impl<'a> Runtime<'a> {
    pub fn new(config: &'a Config, agent: Agent, publisher: Box<dyn Publisher>) -> Self {
        Runtime {
            config,
            agent,
            publisher,
            assembler: PayloadAssembler::new(config.limits),
            history: HistoryStore::new(config.history_file.clone()),
            images: None,
            media: None,
            state: RunState::Idle,
        }
    }

    pub fn with_images(mut self, generator: Box<dyn ImageGenerator>, store: MediaStore) -> Self {
        self.images = Some(generator);
        self.media = Some(store);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// News variant: unseen headlines → AI picks one and writes the post →
    /// publish → remember the link.
    pub async fn run_news(&mut self, source: &dyn CandidateSource) -> RunReport {
        let started_at = Utc::now();
        info!(
            source = source.name(),
            provider = self.agent.provider_name(),
            history = %self.history.path().display(),
            dry_run = self.config.dry_run,
            "news run started"
        );
        let outcome = self.news_steps(source).await;
        self.finish(outcome, started_at)
    }

    /// Word variant: random word → optional image → hashtags → publish.
    /// Keeps no history.
    pub async fn run_word(&mut self, source: &dyn CandidateSource) -> RunReport {
        let started_at = Utc::now();
        info!(
            source = source.name(),
            provider = self.agent.provider_name(),
            images = self.images.is_some(),
            dry_run = self.config.dry_run,
            "word run started"
        );
        let outcome = self.word_steps(source).await;
        self.finish(outcome, started_at)
    }

    async fn news_steps(&mut self, source: &dyn CandidateSource) -> Result<Outcome> {
        self.enter(RunState::Fetching);
        let items = source.fetch(self.config.feed_limit).await;

        self.enter(RunState::Filtering);
        let history = self.history.load();
        let fetched = items.len();
        let unseen: Vec<CandidateItem> = items
            .into_iter()
            .filter(|item| !history.contains(&item.id))
            .collect();
        info!(fetched, unseen = unseen.len(), history = history.len(), "candidates filtered");
        if unseen.is_empty() {
            info!("nothing new to post");
            return Ok(Outcome::NothingNew);
        }

        self.enter(RunState::Requesting);
        let trend_words = self.trend_words().await;
        let raw = self.agent.request_news_post(&unseen, &trend_words).await?;

        self.enter(RunState::Parsing);
        let content = parser::parse_generated_content(&raw)?;
        if !unseen.iter().any(|item| item.id == content.selected_id) {
            return Err(BotError::parse(
                format!("selected_url {} is not one of the offered items", content.selected_id),
                &raw,
            ));
        }

        self.enter(RunState::Assembling);
        let payload = self.assembler.assemble(
            &content.body_text,
            &content.hashtags,
            Some(content.selected_id.as_str()),
        )?;

        self.enter(RunState::Publishing);
        if self.config.dry_run {
            info!(text = %payload.text, chars = payload.weighted_len, "dry run, not publishing");
            return Ok(Outcome::DryRun { payload });
        }
        let post_id = self.publisher.publish(&payload, None).await?;
        self.history
            .record(&content.selected_id)
            .map_err(BotError::History)?;
        info!(%post_id, selected = %content.selected_id, "posted and recorded");
        Ok(Outcome::Posted { post_id, payload })
    }

    async fn word_steps(&mut self, source: &dyn CandidateSource) -> Result<Outcome> {
        self.enter(RunState::Fetching);
        let Some(word) = source.fetch(1).await.into_iter().next() else {
            info!("source produced no word");
            return Ok(Outcome::NothingNew);
        };
        info!(word = %word.title, "word picked");

        self.enter(RunState::Requesting);
        let media = self.illustrate(&word.title).await;
        let raw_tags = match self.agent.request_hashtags(&word.title).await {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(error = %e, "hashtag request failed, posting without hashtags");
                None
            }
        };

        let outcome = self.publish_word(&word.title, raw_tags.as_deref(), media.as_ref()).await;
        if let (Some(store), Some(media)) = (&self.media, &media) {
            store.discard(media).await;
        }
        outcome
    }

    async fn publish_word(
        &mut self,
        word: &str,
        raw_tags: Option<&str>,
        media: Option<&MediaFile>,
    ) -> Result<Outcome> {
        self.enter(RunState::Parsing);
        let hashtags = raw_tags.map(parser::parse_hashtag_lines).unwrap_or_default();
        debug!(count = hashtags.len(), "hashtags parsed");

        self.enter(RunState::Assembling);
        let body = format!("生成単語: {word}");
        let payload = self.assembler.assemble(&body, &hashtags, None)?;

        self.enter(RunState::Publishing);
        if self.config.dry_run {
            info!(text = %payload.text, with_media = media.is_some(), "dry run, not publishing");
            return Ok(Outcome::DryRun { payload });
        }
        let post_id = self.publisher.publish(&payload, media).await?;
        info!(%post_id, word, "posted");
        Ok(Outcome::Posted { post_id, payload })
    }

    /// Trend words only flavour the prompt, so failures are logged and skipped.
    async fn trend_words(&self) -> Vec<String> {
        let raw = match self.agent.request_trend_words().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "trend word request failed");
                return Vec::new();
            }
        };
        match parser::parse_string_array(&raw) {
            Ok(words) => {
                debug!(?words, "trend words");
                words
            }
            Err(e) => {
                warn!(error = %e, raw = %raw, "trend words unreadable");
                Vec::new()
            }
        }
    }

    /// A missing image never blocks the post.
    async fn illustrate(&self, word: &str) -> Option<MediaFile> {
        let (generator, store) = (self.images.as_ref()?, self.media.as_ref()?);
        let prompt = self.agent.instructions().image(word);
        debug!(dir = %store.dir().display(), "requesting image");
        let saved = match generator.generate(&prompt).await {
            Ok(raw) => store.save(raw, word).await,
            Err(e) => Err(e),
        };
        match saved {
            Ok(media) => Some(media),
            Err(e) => {
                warn!(error = %e, "image unavailable, posting text only");
                None
            }
        }
    }

    fn enter(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "state");
        self.state = next;
    }

    fn finish(&mut self, outcome: Result<Outcome>, started_at: chrono::DateTime<Utc>) -> RunReport {
        let last_step = self.state;
        let finished_at = Utc::now();
        let elapsed_ms = (finished_at - started_at).num_milliseconds();

        self.state = match &outcome {
            Ok(_) => RunState::Done,
            Err(e) => {
                match e {
                    BotError::Parse { reason, raw } => {
                        error!(step = ?last_step, reason = %reason, raw = %raw, "run failed: unusable AI response");
                    }
                    BotError::Publish { status, body } => {
                        error!(step = ?last_step, status, body = %body, "run failed: publish rejected");
                    }
                    other => error!(step = ?last_step, error = %other, "run failed"),
                }
                RunState::Failed
            }
        };
        info!(state = ?self.state, step = ?last_step, elapsed_ms, "run finished");

        RunReport {
            state: self.state,
            last_step,
            outcome,
            started_at,
            finished_at,
        }
    }
}
