use accounts::message_tokens;
use axum::{extract::State, http::StatusCode, response::Json};
use common::{ApiResponse, ErrorResponse, MessageTokenDto, MessageTokenRequest};
use tracing::{debug, instrument, warn};

use crate::auth::AuthUser;
use crate::errors::{ApiError, accounts_error, api_error};
use crate::helpers::converters::message_token_dto;
use crate::schemas::AppState;

/// List the push tokens of the signed-in user
#[utoipa::path(
    get,
    path = "/api/message-tokens/",
    tag = "message-tokens",
    responses(
        (status = 200, description = "Tokens retrieved successfully", body = ApiResponse<Vec<MessageTokenDto>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_message_tokens(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<Vec<MessageTokenDto>>>, ApiError> {
    let tokens = message_tokens::list_for_user(&state.db, user.id)
        .await
        .map_err(accounts_error)?;
    debug!("User {} has {} tokens", user.id, tokens.len());
    Ok(Json(ApiResponse::ok(
        tokens.iter().map(message_token_dto).collect(),
        "Message tokens retrieved successfully",
    )))
}

/// Register a device push token
#[utoipa::path(
    post,
    path = "/api/message-tokens/",
    tag = "message-tokens",
    request_body = MessageTokenRequest,
    responses(
        (status = 201, description = "Token registered", body = ApiResponse<MessageTokenDto>),
        (status = 400, description = "Empty token", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn register_message_token(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<MessageTokenRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageTokenDto>>), ApiError> {
    let token = message_tokens::register(&state.db, user.id, &request.fcm_token)
        .await
        .map_err(accounts_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            message_token_dto(&token),
            "Message token registered successfully",
        )),
    ))
}

/// Remove a device push token
#[utoipa::path(
    delete,
    path = "/api/message-tokens/",
    tag = "message-tokens",
    request_body = MessageTokenRequest,
    responses(
        (status = 204, description = "Token removed"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Token not registered for this user", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn delete_message_token(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<MessageTokenRequest>,
) -> Result<StatusCode, ApiError> {
    let removed = message_tokens::remove(&state.db, user.id, &request.fcm_token)
        .await
        .map_err(accounts_error)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        warn!(user_id = user.id, "Token to remove is not registered");
        Err(api_error(
            StatusCode::NOT_FOUND,
            "MESSAGE_TOKEN_NOT_FOUND",
            "Message token not found",
        ))
    }
}
