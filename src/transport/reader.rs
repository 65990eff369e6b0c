use {
    super::{ChunkSource, TransportError},
    async_trait::async_trait,
    tokio::io::{AsyncRead, AsyncReadExt},
};

pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Replays a captured stream (file, stdin, or any `AsyncRead`)
pub struct ReaderSource<R> {
    reader: R,
    chunk_size: usize,
    label: String,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self::with_chunk_size(reader, label, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, label: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            label: label.into(),
        }
    }
}

impl ReaderSource<tokio::fs::File> {
    pub async fn open(path: &str) -> Result<Self, TransportError> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::new(file, path))
    }
}

#[async_trait]
impl<R> ChunkSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut buf = vec![0u8; self.chunk_size];
        let n = self.reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    fn describe(&self) -> String {
        format!("replay {}", self.label)
    }
}
