use axum::{extract::State, http::StatusCode, response::Json};
use common::ErrorResponse;
use tracing::{instrument, warn};

use crate::errors::{ApiError, api_error};
use crate::schemas::{AppState, HealthResponse};

/// Report service and database status
///
/// Mounted regardless of `use_api` and `use_staff`.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 500, description = "Database unreachable", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    if let Err(e) = state.db.ping().await {
        warn!("Database ping failed: {}", e);
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_UNAVAILABLE",
            "Database is not reachable",
        ));
    }

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: "connected".to_string(),
    }))
}
