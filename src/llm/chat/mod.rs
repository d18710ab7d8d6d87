pub mod groq;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::{ LlmConfig, UpstreamError };
use crate::models::chat::WireMessage;
use self::groq::GroqChatClient;

/// Exactly what is sent to the inference provider for one turn.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<WireMessage>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends one completion request. A reply without content is an empty
    /// `response`, not an error.
    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, UpstreamError>;

    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, UpstreamError> {
    let client = GroqChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
