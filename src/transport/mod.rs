//! Chunk sources feeding the ingest loop
//!
//! The core pulls chunks one at a time (`ChunkSource::next_chunk`), so all
//! framing and store mutation happens on the single task that owns the
//! `IngestLoop`. Producers that push instead (a reader on its own task) go
//! through `ChannelSource`.

pub mod channel;
pub mod error_handler;
pub mod http_client;
pub mod reader;

pub use channel::ChannelSource;
pub use error_handler::{ExponentialBackoff, MaxRetriesExceeded};
pub use http_client::HttpStreamSource;
pub use reader::ReaderSource;

use async_trait::async_trait;

#[derive(Debug)]
pub enum TransportError {
    Io(std::io::Error),
    Http(reqwest::Error),
    Status(u16),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(err)
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Io(e) => write!(f, "IO error: {}", e),
            TransportError::Http(e) => write!(f, "HTTP error: {}", e),
            TransportError::Status(code) => write!(f, "Upstream returned HTTP {}", code),
        }
    }
}

impl std::error::Error for TransportError {}

/// Pull-model source of raw byte chunks
#[async_trait]
pub trait ChunkSource: Send {
    /// Next chunk, or `None` when the stream has ended
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Whether a fresh connection can be opened after an error or end of stream
    fn is_reconnectable(&self) -> bool {
        false
    }

    /// Drop the current connection; the next `next_chunk` reconnects.
    fn disconnect(&mut self) {}

    /// Source description for logging
    fn describe(&self) -> String;
}
