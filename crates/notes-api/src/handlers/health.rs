//! Liveness/readiness and API root handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{ApiError, AppState};

/// Probe the store and report service and store state separately.
///
/// # Returns
/// - 200 OK when the store answers
/// - 503 Service Unavailable when it does not
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.notes.check_health().await;
    let (status, body) = if health.healthy {
        (StatusCode::OK, ("healthy", "connected"))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ("degraded", "disconnected"))
    };

    (
        status,
        Json(serde_json::json!({
            "status": body.0,
            "store": body.1,
            "backend": health.backend,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

pub async fn api_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the Notes API.",
    }))
}

/// Fallback for unmatched paths under `/api`.
pub async fn api_not_found() -> ApiError {
    ApiError::NotFound("API route not found".to_string())
}
