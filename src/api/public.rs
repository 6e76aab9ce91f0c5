//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::chat::ChatError;

// Errors

pub struct ApiError(ChatError);

/// Convert `ChatError` into an Axum compatible response. A retryable
/// failure maps to 503 so the UI can tell the user to resend; remote and
/// transport failures map to 502 since the gateway itself is fine.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self.0);

        let status = match &self.0 {
            ChatError::Retryable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChatError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::Remote(_) | ChatError::Network(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(json!({
            "error": self.0.to_string(),
            "retryable": self.0.is_retryable(),
        }));

        (status, body).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_, ChatError>` to
/// turn them into `Result<_, ApiError>`
impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}
