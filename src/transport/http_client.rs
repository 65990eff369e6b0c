use {
    super::{ChunkSource, TransportError},
    async_trait::async_trait,
    reqwest::{header, Client, Response},
};

/// Long-lived streaming GET against the firehose endpoint
pub struct HttpStreamSource {
    client: Client,
    url: String,
    bearer_token: Option<String>,
    response: Option<Response>,
}

impl HttpStreamSource {
    pub fn new(url: impl Into<String>, bearer_token: Option<String>) -> Result<Self, TransportError> {
        // No overall timeout: the response body never finishes
        let client = Client::builder()
            .user_agent(concat!("toptweets/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            bearer_token,
            response: None,
        })
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        log::info!("🔌 Connecting to firehose: {}", self.url);

        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.bearer_token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            log::error!("❌ Firehose rejected connection: HTTP {}", status);
            return Err(TransportError::Status(status.as_u16()));
        }

        log::info!("✅ Firehose connected (HTTP {})", status);
        self.response = Some(response);
        Ok(())
    }
}

#[async_trait]
impl ChunkSource for HttpStreamSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.response.is_none() {
            self.connect().await?;
        }

        let Some(response) = self.response.as_mut() else {
            return Ok(None);
        };

        match response.chunk().await {
            Ok(Some(bytes)) => Ok(Some(bytes.to_vec())),
            Ok(None) => {
                log::warn!("Firehose closed the stream");
                self.response = None;
                Ok(None)
            }
            Err(e) => {
                self.response = None;
                Err(e.into())
            }
        }
    }

    fn is_reconnectable(&self) -> bool {
        true
    }

    fn disconnect(&mut self) {
        self.response = None;
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
