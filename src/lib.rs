
pub mod aggregator;
pub mod config;
pub mod decoder;
pub mod framer;
pub mod ingestion;
pub mod state;
pub mod transport;
pub mod ui;
pub mod window;

pub use aggregator::{top_k, Leaderboard, LeaderboardRow, TopKEntry};
pub use config::{Config, ConfigError, UiMode};
pub use decoder::{decode, validate, DecodeError, ValidatedTweet, ValidationError};
pub use framer::{FramingMode, MessageFramer};
pub use ingestion::{IngestLoop, IngestStats};
pub use state::{StoreInvariantViolation, TweetRecord, TweetStore};
pub use window::WindowDuration;

/// Helper to get current Unix timestamp
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
