use serde::{ Serialize, Deserialize };
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// One element of an outbound message list.
///
/// History entries from the caller are only checked shallowly: anything that
/// is exactly `{ role, content }` becomes a typed message, everything else,
/// including entries carrying extra keys, is forwarded upstream exactly as
/// received.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireMessage {
    Chat(ChatMessage),
    Passthrough(Value),
}

impl WireMessage {
    pub fn from_value(value: Value) -> Self {
        match ChatMessage::deserialize(&value) {
            Ok(message) => WireMessage::Chat(message),
            Err(_) => WireMessage::Passthrough(value),
        }
    }
}

impl From<ChatMessage> for WireMessage {
    fn from(message: ChatMessage) -> Self {
        WireMessage::Chat(message)
    }
}

/// Prior turns supplied by the client. Never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationHistory(Vec<WireMessage>);

impl ConversationHistory {
    /// Any value that is not a JSON array yields an empty history.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self(items.into_iter().map(WireMessage::from_value).collect()),
            _ => Self::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_messages(self) -> Vec<WireMessage> {
        self.0
    }
}

/// Inbound body of `POST /api/v1/chat`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub user_input: Value,
    #[serde(default)]
    pub conversation_history: Value,
}

impl ChatRequest {
    /// Bodies that are not JSON objects carry no `userInput` at all.
    pub fn from_value(body: Value) -> Self {
        match body {
            Value::Object(_) => serde_json::from_value(body).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_keeps_order_of_typed_entries() {
        let history = ConversationHistory::from_value(
            json!([
                { "role": "user", "content": "a" },
                { "role": "assistant", "content": "b" }
            ])
        );

        assert_eq!(
            history.into_messages(),
            vec![
                WireMessage::Chat(ChatMessage::user("a")),
                WireMessage::Chat(ChatMessage::assistant("b"))
            ]
        );
    }

    #[test]
    fn non_array_history_is_empty() {
        for value in [json!(42), json!({ "role": "user" }), json!("text"), Value::Null] {
            assert!(ConversationHistory::from_value(value).is_empty());
        }
    }

    #[test]
    fn malformed_entries_pass_through_untouched() {
        let odd = json!({ "role": "tool", "content": 7 });
        let history = ConversationHistory::from_value(json!([odd.clone(), "loose string"]));

        assert_eq!(
            history.into_messages(),
            vec![WireMessage::Passthrough(odd), WireMessage::Passthrough(json!("loose string"))]
        );
    }

    #[test]
    fn entries_with_extra_keys_keep_them() {
        let named = json!({ "role": "user", "content": "a", "name": "alice" });
        let history = ConversationHistory::from_value(json!([named.clone()]));

        let encoded = serde_json::to_value(history.into_messages()).unwrap();
        assert_eq!(encoded, json!([named]));
    }

    #[test]
    fn passthrough_serializes_verbatim() {
        let raw = json!({ "speaker": "me", "text": "hello" });
        let encoded = serde_json::to_value(WireMessage::Passthrough(raw.clone())).unwrap();
        assert_eq!(encoded, raw);

        let typed = serde_json::to_value(WireMessage::from(ChatMessage::system("be brief"))).unwrap();
        assert_eq!(typed, json!({ "role": "system", "content": "be brief" }));
    }

    #[test]
    fn request_reads_camel_case_fields() {
        let request = ChatRequest::from_value(
            json!({ "userInput": "hi", "conversationHistory": [] })
        );
        assert_eq!(request.user_input, json!("hi"));
        assert_eq!(request.conversation_history, json!([]));
    }

    #[test]
    fn request_from_non_object_has_no_input() {
        for body in [json!(["hi", []]), json!("userInput"), Value::Null] {
            let request = ChatRequest::from_value(body);
            assert!(request.user_input.is_null());
            assert!(request.conversation_history.is_null());
        }
    }
}
