use axum::{extract::State, response::Json};
use tracing::instrument;

use crate::schemas::{AppState, DebugInfo};

/// Runtime snapshot for development; only mounted when `debug` is on.
#[instrument(skip(state))]
pub async fn debug_info(State(state): State<AppState>) -> Json<DebugInfo> {
    state.user_cache.run_pending_tasks().await;
    Json(DebugInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        settings: state.settings.redacted(),
        cached_users: state.user_cache.entry_count(),
    })
}
