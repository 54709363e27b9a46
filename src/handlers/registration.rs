use accounts::{
    AccountsError,
    users::{self, NewUser},
};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use common::{ErrorResponse, LoginResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::{ApiError, accounts_error};
use crate::helpers::converters::user_dto;
use crate::schemas::AppState;

/// Request body for signing up
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegistrationRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password1: String,
    pub password2: String,
    /// Display name
    #[validate(length(max = 150))]
    pub username: Option<String>,
    /// Name used when booking classes
    #[validate(length(max = 150))]
    pub reservation_username: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_kakao: bool,
    #[serde(default)]
    pub is_facebook: bool,
    #[serde(default)]
    pub is_google: bool,
}

/// Sign up and log in
#[utoipa::path(
    post,
    path = "/api/rest-auth/registration/",
    tag = "auth",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<RegistrationRequest>>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    if request.password1 != request.password2 {
        return Err(accounts_error(AccountsError::PasswordMismatch));
    }

    let new_user = NewUser {
        email: request.email,
        password: Some(request.password1),
        username: request.username,
        reservation_username: request.reservation_username,
        phone_number: request.phone_number,
        is_kakao: request.is_kakao,
        is_facebook: request.is_facebook,
        is_google: request.is_google,
        ..Default::default()
    };
    let user = users::create_user(&state.db, new_user)
        .await
        .map_err(accounts_error)?;
    let user = users::touch_last_login(&state.db, user)
        .await
        .map_err(accounts_error)?;
    let token = state.jwt.issue(&user).map_err(accounts_error)?;

    info!(user_id = user.id, "Registered");
    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            user: user_dto(&user),
        }),
    ))
}
