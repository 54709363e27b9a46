use accounts::{users, vouchers};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use common::{
    ApiResponse, ErrorResponse, TeacherDto, UpdateProfileRequest, UserDto, VoucherDto,
    VoucherHistoryDto,
};
use model::{Role, entities::custom_user};
use sea_orm::{ColumnTrait, QueryFilter, QueryOrder};
use tracing::{debug, info, instrument, warn};

use super::rest_auth::profile_update;
use crate::auth::AuthUser;
use crate::errors::{ApiError, accounts_error, api_error};
use crate::helpers::converters::{teacher_dto, user_dto, voucher_dto, voucher_history_dto};
use crate::schemas::AppState;

/// Get the signed-in user
#[utoipa::path(
    get,
    path = "/api/users/me/",
    tag = "users",
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserDto>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(user), fields(user_id = user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::ok(user_dto(&user), "User retrieved successfully"))
}

/// Update the signed-in user's profile
#[utoipa::path(
    patch,
    path = "/api/users/me/",
    tag = "users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserDto>),
        (status = 400, description = "Field too long"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Valid(Json(request)): Valid<Json<UpdateProfileRequest>>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = users::update_profile(&state.db, user, profile_update(request))
        .await
        .map_err(accounts_error)?;
    state.user_cache.invalidate(&user.id).await;

    info!("User {} updated their profile", user.id);
    Ok(Json(ApiResponse::ok(user_dto(&user), "User updated successfully")))
}

/// Withdraw the signed-in user's account
///
/// The account is anonymized rather than deleted so bookings and the voucher
/// ledger keep their owner.
#[utoipa::path(
    post,
    path = "/api/users/me/withdraw/",
    tag = "users",
    responses(
        (status = 200, description = "Account withdrawn", body = ApiResponse<UserDto>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn withdraw_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = users::withdraw(&state.db, user)
        .await
        .map_err(accounts_error)?;
    state.user_cache.invalidate(&user.id).await;

    Ok(Json(ApiResponse::ok(user_dto(&user), "Account withdrawn successfully")))
}

/// Get the signed-in user's voucher
#[utoipa::path(
    get,
    path = "/api/users/me/voucher/",
    tag = "users",
    responses(
        (status = 200, description = "Voucher retrieved successfully", body = ApiResponse<VoucherDto>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User has no voucher", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_my_voucher(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<VoucherDto>>, ApiError> {
    voucher_response(&state, user.id).await
}

pub(crate) async fn voucher_response(
    state: &AppState,
    user_id: i32,
) -> Result<Json<ApiResponse<VoucherDto>>, ApiError> {
    match vouchers::voucher_for_user(&state.db, user_id).await {
        Ok(Some(voucher)) => Ok(Json(ApiResponse::ok(
            voucher_dto(&voucher),
            "Voucher retrieved successfully",
        ))),
        Ok(None) => {
            debug!(user_id, "User has no voucher yet");
            Err(api_error(
                StatusCode::NOT_FOUND,
                "VOUCHER_NOT_FOUND",
                format!("User {} has no voucher", user_id),
            ))
        }
        Err(e) => Err(accounts_error(e)),
    }
}

/// Get the signed-in user's voucher history, newest first
#[utoipa::path(
    get,
    path = "/api/users/me/voucher-history/",
    tag = "users",
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<VoucherHistoryDto>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_my_voucher_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<Vec<VoucherHistoryDto>>>, ApiError> {
    let history = vouchers::history_for_user(&state.db, user.id)
        .await
        .map_err(accounts_error)?;
    Ok(Json(ApiResponse::ok(
        history.iter().map(voucher_history_dto).collect(),
        "Voucher history retrieved successfully",
    )))
}

/// List active teachers
#[utoipa::path(
    get,
    path = "/api/teachers/",
    tag = "users",
    responses(
        (status = 200, description = "Teachers retrieved successfully", body = ApiResponse<Vec<TeacherDto>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _user))]
pub async fn list_teachers(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<ApiResponse<Vec<TeacherDto>>>, ApiError> {
    let teachers = Role::Teacher
        .find()
        .filter(custom_user::Column::IsActive.eq(true))
        .order_by_asc(custom_user::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| accounts_error(e.into()))?;

    if teachers.is_empty() {
        warn!("No active teachers");
    }
    Ok(Json(ApiResponse::ok(
        teachers.iter().map(teacher_dto).collect(),
        "Teachers retrieved successfully",
    )))
}
