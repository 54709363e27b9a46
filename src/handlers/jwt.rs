//! Token endpoints compatible with django-rest-framework-jwt clients.

use accounts::{AccountsError, users};
use axum::{extract::State, response::Json};
use common::{ErrorResponse, ObtainTokenRequest, TokenRequest, TokenResponse};
use tracing::{debug, info, instrument};

use crate::errors::{ApiError, accounts_error};
use crate::schemas::AppState;

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/api/api-jwt-auth/",
    tag = "auth",
    request_body = ObtainTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(request): Json<ObtainTokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = users::authenticate(&state.db, &request.email, &request.password)
        .await
        .map_err(accounts_error)?;
    let token = state.jwt.issue(&user).map_err(accounts_error)?;

    info!(user_id = user.id, "Issued token");
    Ok(Json(TokenResponse { token }))
}

/// Exchange a valid token for one with a fresh expiry
#[utoipa::path(
    post,
    path = "/api/api-jwt-auth/refresh/",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = TokenResponse),
        (status = 400, description = "Refresh is disabled", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let (claims, token) = state.jwt.refresh(&request.token).map_err(accounts_error)?;
    ensure_active_user(&state, claims.user_id).await?;

    debug!(user_id = claims.user_id, "Refreshed token");
    Ok(Json(TokenResponse { token }))
}

/// Check that a token is valid
#[utoipa::path(
    post,
    path = "/api/api-jwt-auth/verify/",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token is valid", body = TokenResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn verify_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let claims = state.jwt.verify(&request.token).map_err(accounts_error)?;
    ensure_active_user(&state, claims.user_id).await?;

    Ok(Json(TokenResponse {
        token: request.token,
    }))
}

/// Tokens of deleted or disabled accounts are refused.
async fn ensure_active_user(state: &AppState, user_id: i32) -> Result<(), ApiError> {
    match users::get_user(&state.db, user_id).await {
        Ok(user) if user.is_active => Ok(()),
        Ok(_) => Err(accounts_error(AccountsError::InactiveUser)),
        Err(AccountsError::UserNotFound(_)) => Err(accounts_error(AccountsError::InvalidToken(
            "User doesn't exist.".to_string(),
        ))),
        Err(e) => Err(accounts_error(e)),
    }
}
