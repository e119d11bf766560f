//! Error types for the HTTP surface.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dojang_store::SubmitError;
use serde_json::json;

/// Result type alias for dojang-api operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised while serving requests.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The submission pipeline failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The request body could not be decoded.
    #[error("Invalid request body: {message}")]
    InvalidBody {
        /// Status chosen by the JSON extractor.
        status: StatusCode,
        /// Decoder message.
        message: String,
    },

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Submit(SubmitError::Validation(e) | SubmitError::Scoring(e)) => {
                if e.is_input_error() {
                    StatusCode::UNPROCESSABLE_ENTITY
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            ApiError::Submit(SubmitError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Submit(SubmitError::Upload(_)) => StatusCode::BAD_GATEWAY,
            ApiError::InvalidBody { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
