//! navi-guide: a bilingual Ocarina of Time companion served over HTTP.

mod api;
mod completion;
mod config;
mod error;
mod guide;
mod locale;
mod prompt;
mod session;
mod speech;
mod summary;
mod transcript;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::completion::groq::GroqClient;
use crate::completion::CompletionInvoker;
use crate::guide::NaviGuide;
use crate::locale::{Language, Locale, Region};
use crate::speech::google::GoogleTts;
use crate::speech::playback::AudioPlayer;
use crate::speech::SpeechRenderer;

#[derive(Parser, Debug)]
#[command(name = "navi-guide", about = "Navi, your guide to Hyrule")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for the HTTP API (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Default language for new sessions: English or French
    #[arg(short, long)]
    language: Option<Language>,

    /// Default region for new sessions: Canada, USA or International
    #[arg(short, long)]
    region: Option<Region>,

    /// Render speech to files without playing it
    #[arg(long)]
    no_playback: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Suppress noisy HTTP and decoder internals
    let filter = if args.verbose {
        EnvFilter::new("debug,hyper=info,reqwest=info,symphonia=info")
    } else {
        EnvFilter::new("info,hyper=warn,reqwest=warn,symphonia=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("navi-guide starting");

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Failed to read .env: {e}");
        }
    }

    let mut config = config::Config::load(args.config.as_deref());
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(language) = args.language {
        config.locale.language = language;
    }
    if let Some(region) = args.region {
        config.locale.region = region;
    }
    if args.no_playback {
        config.playback.enabled = false;
    }
    info!(
        "Config loaded: model {}, locale {}/{}",
        config.completion.model, config.locale.language, config.locale.region
    );

    // The credential is required before anything else starts.
    let api_key = match config.api_key() {
        Ok(key) => key,
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    };

    let backend = Arc::new(GroqClient::new(&config.completion, api_key)?);
    let invoker = Arc::new(CompletionInvoker::new(backend, &config.completion));

    let tts = Arc::new(GoogleTts::new(&config.speech)?);
    let mut speech = SpeechRenderer::new(tts, config.speech.pitch_ratio);
    if let Some(dir) = &config.speech.output_dir {
        std::fs::create_dir_all(dir)?;
        speech = speech.with_output_dir(dir);
    }
    let player = config.playback.enabled.then(AudioPlayer::new);
    if player.is_none() {
        info!("Playback disabled, speech is rendered to files only");
    }

    let default_locale = Locale::new(config.locale.language, config.locale.region);
    let guide = Arc::new(NaviGuide::new(invoker, speech, player, default_locale));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    api::serve(guide, &addr).await?;

    Ok(())
}
