//! Live top-K retweet monitor
//!
//! Usage:
//!   cargo run --release --bin toptweets -- [--tui | --jsonl] [--framing brace|string-aware]
//!
//! Environment variables:
//!   WINDOW_MINUTES - Trailing window (prompted for when unset)
//!   FIREHOSE_URL - Streaming endpoint (default: sample stream)
//!   FIREHOSE_BEARER_TOKEN - Optional bearer token
//!   FIREHOSE_INPUT - Replay a captured stream from a file (`-` for stdin)
//!   TOP_K - Number of originals shown (default: 10)
//!   RENDER_INTERVAL_MS - Render cadence (default: 1000)

use dotenv::dotenv;
use log::{error, info};
use std::time::Duration;

/// Chunks stdin's reader task may run ahead of the ingest loop
const STDIN_CHANNEL_CAPACITY: usize = 64;
use toptweets::{
    config::{prompt_window_minutes, Config, ConfigError, UiMode},
    framer::MessageFramer,
    ingestion::{IngestLoop, RunOutcome},
    state::TweetStore,
    transport::{ChannelSource, ChunkSource, ExponentialBackoff, HttpStreamSource, ReaderSource},
    ui::{ConsoleRenderer, JsonLinesRenderer, Renderer, TuiRenderer},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Logs go to stderr so they stay out of the ranking on stdout
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut config = Config::from_env()?;
    let args: Vec<String> = std::env::args().collect();
    config.apply_args(&args)?;

    let window = match config.window {
        Some(window) => window,
        None if config.input_path.as_deref() == Some("-") => {
            return Err(ConfigError::MissingVariable("WINDOW_MINUTES (stdin carries the stream)".to_string()).into());
        }
        None => {
            let stdin = std::io::stdin();
            prompt_window_minutes(&mut stdin.lock(), &mut std::io::stdout())?
        }
    };

    info!("🚀 Starting toptweets");
    info!("   ├─ Window: {} min", window.minutes());
    info!("   ├─ Top K: {}", config.top_k);
    info!("   ├─ Framing: {}", config.framing_mode.as_str());
    info!("   └─ Render interval: {}ms", config.render_interval_ms);

    let mut source: Box<dyn ChunkSource> = match config.input_path.as_deref() {
        // Piped input keeps arriving while a render blocks, so read it on its own task
        Some("-") => Box::new(ChannelSource::spawn(
            ReaderSource::new(tokio::io::stdin(), "stdin"),
            STDIN_CHANNEL_CAPACITY,
        )),
        Some(path) => Box::new(ReaderSource::open(path).await?),
        None => Box::new(HttpStreamSource::new(config.firehose_url.clone(), config.bearer_token.clone())?),
    };

    let renderer: Box<dyn Renderer> = match config.ui_mode {
        UiMode::Console => Box::new(ConsoleRenderer::stdout()),
        UiMode::JsonLines => Box::new(JsonLinesRenderer::stdout()),
        UiMode::Tui => Box::new(TuiRenderer::new()?),
    };

    let mut ingest = IngestLoop::new(
        MessageFramer::new(config.framing_mode),
        TweetStore::new(),
        window,
        config.top_k,
        Duration::from_millis(config.render_interval_ms),
        renderer,
    );

    let mut backoff = ExponentialBackoff::new(
        config.reconnect_initial_delay_secs,
        config.reconnect_max_delay_secs,
        config.reconnect_max_retries,
    );

    let result = tokio::select! {
        result = ingest.run_with_reconnect(source.as_mut(), &mut backoff) => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                error!("❌ Failed to listen for CTRL+C: {}", err);
            }
            info!("⚠️  Received CTRL+C, shutting down...");
            Ok(RunOutcome::Quit)
        }
    };

    ingest.finish();

    match result {
        Ok(outcome) => {
            info!("✅ Stopped ({:?})", outcome);
            Ok(())
        }
        Err(e) => {
            error!("❌ Ingest failed: {}", e);
            Err(e)
        }
    }
}
