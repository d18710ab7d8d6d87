use crate::agent::{ AgentError, ChatAgent };
use crate::config::CorsOrigins;
use crate::models::chat::{ ChatRequest, ChatResponse };
use crate::relay::RelayClient;
use super::error::{ ApiError, BODY_TOO_LARGE, INVALID_JSON, PROCESSING_FAILED, RELAY_FAILED };

use axum::{
    body::Bytes,
    extract::{ rejection::BytesRejection, State },
    http::{ header::CONTENT_TYPE, HeaderMap, StatusCode },
    routing::{ get, post },
    Json,
    Router,
};
use log::{ info, warn, error };
use serde_json::{ Map, Value };
use tower_http::cors::{ AllowOrigin, Any, CorsLayer };
use url::form_urlencoded;
use uuid::Uuid;

pub const CHAT_ROUTE: &str = "/api/v1/chat";
pub const RELAY_ROUTE: &str = "/api/chat";

/// What the HTTP layer hands requests to.
#[derive(Clone)]
pub enum Backend {
    Chat(ChatAgent),
    Relay(RelayClient),
}

pub fn router(backend: Backend, cors: &CorsOrigins) -> Router {
    let app = match backend {
        Backend::Chat(agent) =>
            Router::new()
                .route("/", get(root_handler))
                .route(CHAT_ROUTE, post(chat_handler))
                .with_state(agent),
        Backend::Relay(relay) =>
            Router::new()
                .route("/", get(root_handler))
                .route(RELAY_ROUTE, post(relay_handler))
                .with_state(relay),
    };
    app.layer(cors_layer(cors))
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().cloned()),
    };
    CorsLayer::new().allow_origin(allow_origin).allow_methods(Any).allow_headers(Any)
}

/// An empty body reads as `null` so that it fails input validation rather
/// than JSON parsing.
fn parse_body(body: &Bytes) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Flat `key=value` pairs become a JSON object of strings; a repeated key
/// keeps its last value. Bracketed keys are not expanded.
fn parse_form(body: &Bytes) -> Value {
    let fields: Map<String, Value> = form_urlencoded::parse(body)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect();
    Value::Object(fields)
}

fn decode_body(headers: &HeaderMap, body: &Bytes) -> Result<Value, serde_json::Error> {
    if is_form(headers) {
        return Ok(parse_form(body));
    }
    parse_body(body)
}

/// Body extraction failures still answer with the JSON error envelope.
fn read_rejection(rejection: &BytesRejection, otherwise: ApiError) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(BODY_TOO_LARGE)
    } else {
        otherwise
    }
}

async fn root_handler() -> &'static str {
    "Hello World!"
}

async fn chat_handler(
    State(agent): State<ChatAgent>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    let body = body.map_err(|rejection| {
        warn!("[{}] Could not read chat request body: {}", request_id, rejection);
        read_rejection(&rejection, ApiError::BadRequest(INVALID_JSON))
    })?;

    let payload = decode_body(&headers, &body).map_err(|e| {
        warn!("[{}] Rejected chat request with malformed JSON: {}", request_id, e);
        ApiError::BadRequest(INVALID_JSON)
    })?;

    match agent.process_message(&request_id, ChatRequest::from_value(payload)).await {
        Ok(response) => {
            info!("[{}] Chat request completed", request_id);
            Ok(Json(ChatResponse { response }))
        }
        Err(AgentError::InvalidRequest(message)) => {
            warn!("[{}] Rejected chat request: {}", request_id, message);
            Err(ApiError::BadRequest(message))
        }
        Err(AgentError::Upstream(e)) => {
            error!("[{}] Error processing chat request: {}", request_id, e);
            Err(ApiError::Internal(PROCESSING_FAILED))
        }
    }
}

async fn relay_handler(
    State(relay): State<RelayClient>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    let body = body.map_err(|rejection| {
        error!("[{}] Error in chat route: {}", request_id, rejection);
        read_rejection(&rejection, ApiError::Internal(RELAY_FAILED))
    })?;

    let payload = if is_form(&headers) {
        Ok(parse_form(&body))
    } else {
        serde_json::from_slice::<Value>(&body)
    };
    let payload = payload.map_err(|e| {
        error!("[{}] Error in chat route: unreadable request body: {}", request_id, e);
        ApiError::Internal(RELAY_FAILED)
    })?;

    info!("[{}] Relaying chat request to {}", request_id, relay.url());
    relay.forward(&payload).await.map(Json).map_err(|e| {
        error!("[{}] Error in chat route: {}", request_id, e);
        ApiError::Internal(RELAY_FAILED)
    })
}
