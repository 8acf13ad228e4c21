//! HTTP error mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Generic message returned for any server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error returned by every handler.
///
/// Client errors carry their message through; store errors are logged here
/// and answered with [`INTERNAL_ERROR_MESSAGE`] so backend details never
/// reach the client.
#[derive(Debug)]
pub enum ApiError {
    Store(notes_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<notes_core::Error> for ApiError {
    fn from(err: notes_core::Error) -> Self {
        match err {
            notes_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            notes_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            other => ApiError::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(err) => {
                error!(subsystem = "api", error = %err, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
