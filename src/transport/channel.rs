use {
    super::{ChunkSource, TransportError},
    async_trait::async_trait,
    tokio::sync::mpsc,
};

pub type ChunkResult = Result<Vec<u8>, TransportError>;

/// Chunks pushed by a separate reader task
///
/// The reader owns the sending half; the ingest loop stays the only
/// consumer, so store mutation remains single-writer. A read error is
/// forwarded once and ends the stream.
pub struct ChannelSource {
    rx: mpsc::Receiver<ChunkResult>,
    label: String,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<ChunkResult>, label: impl Into<String>) -> Self {
        Self { rx, label: label.into() }
    }

    /// Bounded channel pair; `buffer` chunks of backpressure
    pub fn channel(buffer: usize, label: impl Into<String>) -> (mpsc::Sender<ChunkResult>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self::new(rx, label))
    }

    /// Drive `upstream` on its own task, pushing every chunk into the channel.
    ///
    /// The task ends at end of stream, after forwarding an error, or once
    /// this source is dropped.
    pub fn spawn<S>(mut upstream: S, buffer: usize) -> Self
    where
        S: ChunkSource + 'static,
    {
        let label = upstream.describe();
        let (tx, source) = Self::channel(buffer, format!("{} (reader task)", label));

        tokio::spawn(async move {
            loop {
                let item = match upstream.next_chunk().await {
                    Ok(Some(chunk)) => Ok(chunk),
                    Ok(None) => break,
                    Err(e) => Err(e),
                };
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    break;
                }
            }
            log::debug!("Reader task for {} finished", label);
        });

        source
    }
}

#[async_trait]
impl ChunkSource for ChannelSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.rx.recv().await {
            Some(item) => item.map(Some),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
