//! HTTP handlers for the REST API.
//!
//! Each handler extracts and validates its input, then delegates to the
//! service layer.

pub mod availability;
pub mod listings;
pub mod reservations;
pub mod reviews;
pub mod users;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
///
/// 200 when the repository answers, 500 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database) = match state.repository.health_check().await {
        Ok(true) => (StatusCode::OK, "connected".to_string()),
        Ok(false) => (StatusCode::INTERNAL_SERVER_ERROR, "disconnected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("error: {}", e))
        }
    };

    (
        status,
        Json(HealthResponse {
            status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
        }),
    )
}
