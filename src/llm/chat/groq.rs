use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::Deserialize;
use std::time::Duration;

use super::{ ChatClient, CompletionRequest, CompletionResponse };
use crate::llm::{ LlmConfig, UpstreamError, DEFAULT_GROQ_BASE_URL };

const COMPLETIONS_PATH: &str = "/chat/completions";

pub struct GroqChatClient {
    http: HttpClient,
    base_url: String,
}

#[derive(Deserialize)]
struct GroqResponse {
    choices: Vec<Option<GroqChoice>>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: Option<GroqMessage>,
}

#[derive(Deserialize)]
struct GroqMessage {
    content: Option<String>,
}

impl GroqResponse {
    fn first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .flatten()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

impl GroqChatClient {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        timeout: Option<Duration>
    ) -> Result<Self, UpstreamError> {
        let api_url = base_url.unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| UpstreamError::Config(format!("Invalid API key format: {}", e)))?
        );

        let mut builder = HttpClient::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| UpstreamError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, UpstreamError> {
        Self::new(&config.api_key, config.base_url.clone(), config.timeout)
    }

    fn completions_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), COMPLETIONS_PATH)
    }
}

#[async_trait]
impl ChatClient for GroqChatClient {
    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, UpstreamError> {
        let url = self.completions_url();
        debug!("Sending {} messages to {} (model {})", request.messages.len(), url, request.model);

        let resp = self.http.post(&url).json(request).send().await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Status { status, body });
        }

        let parsed = serde_json::from_str::<GroqResponse>(&body).map_err(UpstreamError::Decode)?;

        Ok(CompletionResponse { response: parsed.first_content() })
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
