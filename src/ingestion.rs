//! Ingest loop - single owner of the framer, store and renderer
//!
//! Chunks are pulled from a `ChunkSource` one at a time and fully processed
//! (frame → decode → store) before the next is requested, so the store has
//! exactly one writer and needs no lock. Cancelling `run` between chunks
//! leaves the store consistent: a validated tweet's two records are written
//! inside one synchronous call.
//!
//! Rendering is gated by wall-clock time: at most one render per
//! `render_interval`, no matter how many chunks arrive.

use {
    crate::{
        aggregator::{top_k, Leaderboard, TopKEntry},
        decoder::{decode_tweet, DecodeError, ValidationError},
        framer::MessageFramer,
        state::TweetStore,
        transport::{ChunkSource, ExponentialBackoff, TransportError},
        ui::{RenderOutcome, Renderer},
        window::WindowDuration,
    },
    std::time::{Duration, Instant},
};

/// Throughput log cadence
const STATS_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Counters for everything the loop has seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub chunks: u64,
    pub bytes: u64,
    pub frames: u64,
    pub parse_errors: u64,
    pub invalid: u64,
    /// Well-formed messages that are not retweets (ignored by design)
    pub non_retweets: u64,
    pub stored: u64,
    pub invariant_violations: u64,
    pub renders: u64,
}

impl IngestStats {
    /// Frames discarded because they could not be used
    pub fn dropped(&self) -> u64 {
        self.parse_errors + self.invalid + self.invariant_violations
    }
}

/// Why `run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    SourceExhausted,
    Quit,
}

pub struct IngestLoop {
    framer: MessageFramer,
    store: TweetStore,
    window: WindowDuration,
    top_k: usize,
    render_interval: Duration,
    last_render: Instant,
    renderer: Box<dyn Renderer>,
    stats: IngestStats,
    last_log_time: Instant,
    frames_at_last_log: u64,
}

impl IngestLoop {
    pub fn new(
        framer: MessageFramer,
        store: TweetStore,
        window: WindowDuration,
        top_k: usize,
        render_interval: Duration,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let now = Instant::now();
        Self {
            framer,
            store,
            window,
            top_k,
            render_interval,
            last_render: now,
            renderer,
            stats: IngestStats::default(),
            last_log_time: now,
            frames_at_last_log: 0,
        }
    }

    /// Feed one raw chunk through framing, decoding and storage.
    pub fn on_chunk(&mut self, chunk: &[u8]) -> RenderOutcome {
        self.stats.chunks += 1;
        self.stats.bytes += chunk.len() as u64;

        self.framer.append(chunk);
        for frame in self.framer.drain_complete() {
            self.process_frame(&frame);
        }

        if self.last_render.elapsed() >= self.render_interval {
            self.render_now()
        } else {
            RenderOutcome::Continue
        }
    }

    fn process_frame(&mut self, frame: &[u8]) {
        self.stats.frames += 1;

        match decode_tweet(frame) {
            Ok(tweet) => match self.store.add_validated_tweet(tweet) {
                Ok(()) => self.stats.stored += 1,
                Err(e) => {
                    log::warn!("⚠️  Dropping retweet: {}", e);
                    self.stats.invariant_violations += 1;
                }
            },
            Err(DecodeError::Validation(ValidationError::NotARetweet)) => {
                self.stats.non_retweets += 1;
            }
            Err(DecodeError::Validation(e)) => {
                log::debug!("Dropping invalid message: {}", e);
                self.stats.invalid += 1;
            }
            Err(DecodeError::Parse(e)) => {
                log::debug!("Dropping unparseable block ({} bytes): {}", frame.len(), e);
                self.stats.parse_errors += 1;
            }
        }
    }

    /// Render immediately, resetting the render clock.
    pub fn render_now(&mut self) -> RenderOutcome {
        self.last_render = Instant::now();
        let board = self.leaderboard();
        self.stats.renders += 1;

        match self.renderer.render(&board, &self.stats) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Render error: {}", e);
                RenderOutcome::Continue
            }
        }
    }

    /// Current ranking with snippets, evicting expired records first
    pub fn leaderboard(&mut self) -> Leaderboard {
        let now = self.store.now();
        Leaderboard::build(&mut self.store, self.top_k, now, self.window)
    }

    pub fn top_k(&mut self, k: usize, now: i64) -> Vec<TopKEntry> {
        top_k(&mut self.store, k, now, self.window)
    }

    /// Pull chunks until the source ends or the renderer asks to quit.
    pub async fn run(&mut self, source: &mut dyn ChunkSource) -> Result<RunOutcome, TransportError> {
        log::info!("📡 Reading from {}", source.describe());

        while let Some(chunk) = source.next_chunk().await? {
            if self.on_chunk(&chunk) == RenderOutcome::Quit {
                log::info!("Quit requested");
                return Ok(RunOutcome::Quit);
            }
            self.log_throughput();
        }

        Ok(RunOutcome::SourceExhausted)
    }

    /// `run`, reconnecting reconnectable sources with backoff.
    ///
    /// A partial object from a dropped connection is discarded before
    /// reconnecting. The backoff resets whenever a connection delivered data.
    pub async fn run_with_reconnect(
        &mut self,
        source: &mut dyn ChunkSource,
        backoff: &mut ExponentialBackoff,
    ) -> Result<RunOutcome, Box<dyn std::error::Error>> {
        loop {
            let chunks_before = self.stats.chunks;
            let result = self.run(source).await;
            if self.stats.chunks > chunks_before {
                backoff.reset();
            }

            match result {
                Ok(RunOutcome::Quit) => return Ok(RunOutcome::Quit),
                Ok(RunOutcome::SourceExhausted) if !source.is_reconnectable() => {
                    return Ok(RunOutcome::SourceExhausted)
                }
                Ok(RunOutcome::SourceExhausted) => {
                    log::warn!("⚠️  Stream from {} ended", source.describe());
                }
                Err(e) if !source.is_reconnectable() => return Err(e.into()),
                Err(e) => {
                    log::error!("❌ Stream error from {}: {}", source.describe(), e);
                }
            }

            self.framer.reset();
            source.disconnect();
            backoff.sleep().await?;
        }
    }

    /// Final render and renderer teardown
    pub fn finish(&mut self) {
        self.render_now();
        if let Err(e) = self.renderer.shutdown() {
            log::error!("Renderer shutdown error: {}", e);
        }
        log::info!(
            "✅ Ingest finished: {} frames, {} stored, {} dropped, {} non-retweets",
            self.stats.frames,
            self.stats.stored,
            self.stats.dropped(),
            self.stats.non_retweets
        );
    }

    fn log_throughput(&mut self) {
        let elapsed = self.last_log_time.elapsed();
        if elapsed < STATS_LOG_INTERVAL {
            return;
        }

        let frames = self.stats.frames - self.frames_at_last_log;
        log::info!(
            "📊 Ingestion rate: {:.1} frames/sec (total: {}, stored: {}, dropped: {}, live records: {})",
            frames as f64 / elapsed.as_secs_f64(),
            self.stats.frames,
            self.stats.stored,
            self.stats.dropped(),
            self.store.len()
        );

        self.last_log_time = Instant::now();
        self.frames_at_last_log = self.stats.frames;
    }

    pub fn store(&self) -> &TweetStore {
        &self.store
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn buffered_bytes(&self) -> usize {
        self.framer.buffered_len()
    }
}
