use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use thiserror::Error;

use crate::models::chat::ErrorResponse;

pub const PROCESSING_FAILED: &str = "An error occurred while processing your request.";
pub const RELAY_FAILED: &str = "Internal server error";
pub const INVALID_JSON: &str = "Invalid JSON body";
pub const BODY_TOO_LARGE: &str = "Request body too large";

/// What a caller sees when a request fails. Upstream detail never ends up
/// in here; it is logged where the failure is caught.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0}")]
    PayloadTooLarge(&'static str),
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
