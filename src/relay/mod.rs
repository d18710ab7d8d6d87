use log::debug;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay returned a body that is not JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Forwards request bodies to a separately hosted chat service without
/// looking inside them.
#[derive(Clone)]
pub struct RelayClient {
    http: HttpClient,
    url: Url,
}

impl RelayClient {
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self, RelayError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { http: builder.build()?, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The upstream status is not inspected; whatever JSON comes back is the
    /// answer.
    pub async fn forward(&self, body: &Value) -> Result<Value, RelayError> {
        let resp = self.http.post(self.url.clone()).json(body).send().await?;
        debug!("Relay {} answered {}", self.url, resp.status());
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(RelayError::Decode)
    }
}
