//! Maps pipeline errors onto HTTP status codes and user-facing messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use policysage_core::Error;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed.";
pub const UNREADABLE_RESPONSE_MESSAGE: &str =
    "The AI returned a response in an unexpected format that could not be repaired.";
pub const RATE_LIMITED_MESSAGE: &str =
    "The service is busy (API usage limit exceeded). Please wait a few minutes and try again.";
pub const GENERIC_MESSAGE: &str = "An error occurred on the server during analysis.";

/// Kinds of generative service failure, told apart by message inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    /// Service or model inaccessible.
    Access,
    /// Quota exceeded.
    RateLimited,
    Other,
}

pub fn classify_upstream(message: &str) -> UpstreamKind {
    if message.contains("404") || message.to_lowercase().contains("model not found") {
        UpstreamKind::Access
    } else if message.contains("429") {
        UpstreamKind::RateLimited
    } else {
        UpstreamKind::Other
    }
}

/// JSON error response: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE)
    }

    /// Classify a pipeline error. `model` is named in access errors.
    pub fn from_error(err: Error, model: &str) -> Self {
        match err {
            Error::Input(msg) => {
                warn!("Rejected request: {}", msg);
                Self::new(StatusCode::BAD_REQUEST, msg)
            }
            Error::Upload(msg) => {
                warn!("Malformed upload: {}", msg);
                Self::new(StatusCode::BAD_REQUEST, format!("Malformed upload: {msg}"))
            }
            Error::PayloadTooLarge(msg) => {
                warn!("Upload too large: {}", msg);
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, format!("File too large: {msg}"))
            }
            Error::Upstream(msg) => {
                error!("API Error: {}", msg);
                let message = match classify_upstream(&msg) {
                    UpstreamKind::Access => format!(
                        "Model \"{model}\" was not found. Make sure your API key has access to this model."
                    ),
                    UpstreamKind::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
                    UpstreamKind::Other if msg.is_empty() => GENERIC_MESSAGE.to_string(),
                    UpstreamKind::Other => msg,
                };
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            Error::Decode { .. } | Error::Structural(_) => {
                // The raw response was already logged by the decoder.
                error!("Unusable model response: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, UNREADABLE_RESPONSE_MESSAGE)
            }
            other => {
                error!("API Error: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
