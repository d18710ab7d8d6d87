pub mod chat;

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "llama3-8b-8192";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

/// Anything that went wrong between sending the completion request and
/// holding a decoded reply. Carries detail for the server log only.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream returned {status}: {body}")]
    Status {
        status: StatusCode,
        body: String,
    },

    #[error("upstream response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid upstream client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { UpstreamError::Timeout } else { UpstreamError::Transport(err) }
    }
}
