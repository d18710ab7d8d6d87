use crate::config::persona::PersonaConfig;
use crate::llm::UpstreamError;
use crate::llm::chat::{ ChatClient, CompletionRequest };
use crate::models::chat::{ ChatMessage, ChatRequest, ConversationHistory, WireMessage };

use log::{ debug, info };
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub const USER_INPUT_REQUIRED: &str = "User input is required";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{0}")]
    InvalidRequest(&'static str),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Turns one client turn into one upstream completion.
#[derive(Clone)]
pub struct ChatAgent {
    chat_client: Arc<dyn ChatClient>,
    persona: PersonaConfig,
}

impl ChatAgent {
    pub fn new(chat_client: Arc<dyn ChatClient>, persona: PersonaConfig) -> Self {
        Self { chat_client, persona }
    }

    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    pub async fn process_message(
        &self,
        request_id: &str,
        request: ChatRequest
    ) -> Result<String, AgentError> {
        if !is_truthy(&request.user_input) {
            return Err(AgentError::InvalidRequest(USER_INPUT_REQUIRED));
        }

        let history = ConversationHistory::from_value(request.conversation_history);
        let completion = self.assemble(&request.user_input, history);
        info!(
            "[{}] Forwarding {} messages to {}",
            request_id,
            completion.messages.len(),
            self.chat_client.get_base_url()
        );

        let reply = self.chat_client.complete(&completion).await?;
        debug!("[{}] Upstream replied with {} bytes", request_id, reply.response.len());
        Ok(reply.response)
    }

    /// Persona first, then history in the caller's order, then the new turn.
    pub fn assemble(&self, user_input: &Value, history: ConversationHistory) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(WireMessage::from(ChatMessage::system(self.persona.prompt.as_str())));
        messages.extend(history.into_messages());
        messages.push(WireMessage::from(ChatMessage::user(self.user_content(user_input))));

        CompletionRequest {
            messages,
            model: self.persona.model.clone(),
        }
    }

    fn user_content(&self, user_input: &Value) -> String {
        match user_input {
            Value::String(text) if self.persona.escape_input => format_as_json_input(text),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Escapes backslash, double quote and newline for embedding in a JSON string.
pub fn format_as_json_input(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}
