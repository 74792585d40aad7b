mod config;
mod core;
mod error;
mod memory;
mod models;
mod providers;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, TextProvider};
use crate::core::{agent::Agent, runtime::Runtime};
use crate::providers::anthropic::Anthropic;
use crate::providers::gemini::Gemini;
use crate::providers::image::{HttpImageGenerator, MediaStore};
use crate::providers::news_feed::NewsFeed;
use crate::providers::twitter::Twitter;
use crate::providers::vocabulary::Vocabulary;
use crate::providers::{Publisher, TextGenerator};

/// Exit code for configuration problems found before a run starts.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "kotoba-bot", version, about = "Posts AI-written Japanese words and news takes to X")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Build the post and log it without publishing or updating history.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Override HISTORY_FILE.
    #[arg(long, global = true)]
    history_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Pick an unseen headline from the RSS feed and post a take on it.
    News {
        /// How many feed entries to consider.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Post a random three-letter hiragana word with an image and hashtags.
    Word,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dotenv_result = dotenv::dotenv();
    init_tracing();
    if let Err(e) = dotenv_result {
        warn!(error = %e, "no .env file loaded");
    }

    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{e:#}"), "configuration invalid");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let client = match http_client(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %format!("{e:#}"), "could not build HTTP client");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let runtime = match build_runtime(&config, &cli.mode, &client) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %format!("{e:#}"), "could not set up collaborators");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let report = run(runtime, &config, &cli.mode, client).await;
    info!(
        outcome = ?report.outcome,
        started_at = %report.started_at.to_rfc3339(),
        finished_at = %report.finished_at.to_rfc3339(),
        "exiting"
    );
    ExitCode::from(report.exit_code())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kotoba_bot=info,warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env().context("reading environment")?;
    if cli.dry_run {
        config.dry_run = true;
    }
    if let Some(path) = &cli.history_file {
        config.history_file = path.clone();
    }
    if let Mode::News { limit: Some(limit) } = cli.mode {
        config.feed_limit = limit;
    }
    config.validate()?;
    Ok(config)
}

fn http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.http_timeout)
        .user_agent(concat!("kotoba-bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")
}

fn build_runtime<'a>(
    config: &'a Config,
    mode: &Mode,
    client: &reqwest::Client,
) -> anyhow::Result<Runtime<'a>> {
    let generator: Box<dyn TextGenerator> = match config.text_provider {
        TextProvider::Gemini => {
            let key = config
                .gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY not set")?;
            Box::new(Gemini::new(client.clone(), key, &config.gemini_model))
        }
        TextProvider::Anthropic => {
            let key = config
                .anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY not set")?;
            Box::new(Anthropic::new(key, config.anthropic_model.as_deref()))
        }
    };

    let publisher: Box<dyn Publisher> = match &config.twitter {
        Some(credentials) => Box::new(Twitter::new(client.clone(), credentials.clone())),
        None => Box::new(DisabledPublisher),
    };

    let mut runtime = Runtime::new(config, Agent::new(generator), publisher);
    if let (Mode::Word, Some(endpoint)) = (mode, &config.image_api_url) {
        let images = HttpImageGenerator::new(client.clone(), endpoint.as_str(), config.image_api_token.clone());
        runtime = runtime.with_images(Box::new(images), MediaStore::new(client.clone(), &config.media_dir));
    }
    Ok(runtime)
}

async fn run(
    mut runtime: Runtime<'_>,
    config: &Config,
    mode: &Mode,
    client: reqwest::Client,
) -> models::RunReport {
    match mode {
        Mode::News { .. } => {
            let feed = NewsFeed::new(client, config.rss_url.as_str());
            runtime.run_news(&feed).await
        }
        Mode::Word => runtime.run_word(&Vocabulary::new()).await,
    }
}

/// Stands in when no X credentials are configured; `validate` only allows
/// that for dry runs, which never reach the publisher.
struct DisabledPublisher;

#[async_trait::async_trait]
impl Publisher for DisabledPublisher {
    async fn publish(
        &self,
        _payload: &models::PostPayload,
        _media: Option<&models::MediaFile>,
    ) -> error::Result<models::PostId> {
        Err(error::BotError::Config("publishing is disabled: X credentials missing".to_string()))
    }
}
