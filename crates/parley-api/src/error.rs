//! API error types and JSON error response formatting.
//!
//! Every failure leaves the server as `{"error": code, "message": ...}`
//! with an HTTP status matching the code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use parley_chat::ChatError;
use parley_core::error::ParleyError;

use crate::upstream::UpstreamError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "model_loading").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Upstream response text, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - malformed body or invalid message text.
    BadRequest(String),
    /// 500 - the relay has no credentials for the model.
    MissingToken(String),
    /// 503 - the model is warming up.
    ModelLoading(String),
    /// 502 - the model endpoint failed.
    Upstream {
        message: String,
        detail: Option<String>,
    },
    /// 500 - the model answered without generated text.
    BadResponse(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::MissingToken(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "missing_token", msg, None)
            }
            ApiError::ModelLoading(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "model_loading", msg, None)
            }
            ApiError::Upstream { message, detail } => {
                (StatusCode::BAD_GATEWAY, "upstream_error", message, detail)
            }
            ApiError::BadResponse(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "bad_response", msg, None)
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            detail,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ParleyError> for ApiError {
    fn from(err: ParleyError) -> Self {
        match &err {
            ParleyError::Storage(msg) => ApiError::Internal(msg.clone()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage | ChatError::MessageTooLong(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ChatError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingToken(_) => ApiError::MissingToken(err.to_string()),
            UpstreamError::Loading => ApiError::ModelLoading(err.to_string()),
            UpstreamError::Status { status, detail } => ApiError::Upstream {
                message: format!("model endpoint returned status {}", status),
                detail,
            },
            UpstreamError::Transport(msg) => ApiError::Upstream {
                message: msg,
                detail: None,
            },
            UpstreamError::NoOutput => ApiError::BadResponse(err.to_string()),
        }
    }
}
