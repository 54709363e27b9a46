use accounts::users::{self, ProfileUpdate};
use axum::{extract::State, response::Json};
use axum_valid::Valid;
use common::{
    DetailResponse, ErrorResponse, LoginResponse, ObtainTokenRequest, PasswordChangeRequest,
    UpdateProfileRequest, UserDto,
};
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::errors::{ApiError, accounts_error};
use crate::helpers::converters::user_dto;
use crate::schemas::AppState;

pub(crate) fn profile_update(request: UpdateProfileRequest) -> ProfileUpdate {
    ProfileUpdate {
        username: request.username,
        reservation_username: request.reservation_username,
        phone_number: request.phone_number,
        postcode: request.postcode,
        address: request.address,
        done_tutorial: request.done_tutorial,
    }
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/rest-auth/login/",
    tag = "auth",
    request_body = ObtainTokenRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<ObtainTokenRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = users::authenticate(&state.db, &request.email, &request.password)
        .await
        .map_err(accounts_error)?;
    let user = users::touch_last_login(&state.db, user)
        .await
        .map_err(accounts_error)?;
    state.user_cache.invalidate(&user.id).await;

    let token = state.jwt.issue(&user).map_err(accounts_error)?;
    info!(user_id = user.id, "Logged in");
    Ok(Json(LoginResponse {
        token,
        user: user_dto(&user),
    }))
}

/// Log out
///
/// Tokens are stateless, so this only acknowledges the request; clients
/// drop their token.
#[utoipa::path(
    post,
    path = "/api/rest-auth/logout/",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = DetailResponse)
    )
)]
#[instrument]
pub async fn logout() -> Json<DetailResponse> {
    Json(DetailResponse {
        detail: "Successfully logged out.".to_string(),
    })
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/rest-auth/user/",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(user), fields(user_id = user.id))]
pub async fn user_details(AuthUser(user): AuthUser) -> Json<UserDto> {
    Json(user_dto(&user))
}

/// Update the current user's profile
#[utoipa::path(
    patch,
    path = "/api/rest-auth/user/",
    tag = "auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Field too long"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_user_details(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Valid(Json(request)): Valid<Json<UpdateProfileRequest>>,
) -> Result<Json<UserDto>, ApiError> {
    let user = users::update_profile(&state.db, user, profile_update(request))
        .await
        .map_err(accounts_error)?;
    state.user_cache.invalidate(&user.id).await;
    Ok(Json(user_dto(&user)))
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/api/rest-auth/password/change/",
    tag = "auth",
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password changed", body = DetailResponse),
        (status = 400, description = "New passwords differ or are too short", body = ErrorResponse),
        (status = 401, description = "Wrong old password", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn password_change(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Valid(Json(request)): Valid<Json<PasswordChangeRequest>>,
) -> Result<Json<DetailResponse>, ApiError> {
    let user = users::change_password(
        &state.db,
        user,
        &request.old_password,
        &request.new_password1,
        &request.new_password2,
    )
    .await
    .map_err(accounts_error)?;
    state.user_cache.invalidate(&user.id).await;

    Ok(Json(DetailResponse {
        detail: "New password has been saved.".to_string(),
    }))
}
