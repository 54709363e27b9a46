//! Staff-only management API mounted under `/admin/`.

use accounts::{
    VoucherLedger, teacher_groups,
    users::{self, AdminUpdate, ProfileUpdate},
    vouchers,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{NaiveDate, Utc};
use common::{
    ApiResponse, ErrorResponse, TeacherGroupAssignment, TeacherGroupDto, TeacherGroupRequest,
    UserDto, VoucherDto, VoucherHistoryDto, VoucherOperation, VoucherStatementDto,
};
use model::{Role, entities::custom_user};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::users::voucher_response;
use crate::auth::StaffUser;
use crate::errors::{ApiError, accounts_error, api_error};
use crate::helpers::converters::{staff_user_dto, teacher_group_dto, voucher_history_dto, voucher_statement_dto};
use crate::schemas::AppState;

const MAX_GROUP_NAME_LEN: usize = 30;

/// Query parameters for listing users
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct UserListQuery {
    /// Restrict to one role: customer, teacher, staff or operator
    pub role: Option<String>,
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 50)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

/// Request body for editing a user as staff
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct AdminUserUpdateRequest {
    #[validate(length(max = 150))]
    pub username: Option<String>,
    #[validate(length(max = 150))]
    pub reservation_username: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(max = 10))]
    pub postcode: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    pub done_tutorial: Option<bool>,
    pub is_active: Option<bool>,
    pub is_teacher: Option<bool>,
    pub is_operator: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub staff_memo: Option<String>,
}

impl From<AdminUserUpdateRequest> for AdminUpdate {
    fn from(request: AdminUserUpdateRequest) -> Self {
        Self {
            profile: ProfileUpdate {
                username: request.username,
                reservation_username: request.reservation_username,
                phone_number: request.phone_number,
                postcode: request.postcode,
                address: request.address,
                done_tutorial: request.done_tutorial,
            },
            is_active: request.is_active,
            is_teacher: request.is_teacher,
            is_operator: request.is_operator,
            is_staff: request.is_staff,
            is_superuser: request.is_superuser,
            staff_memo: request.staff_memo,
        }
    }
}

/// Query parameters for expiring vouchers
#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpireQuery {
    /// Day to expire against (default: today, UTC)
    pub today: Option<NaiveDate>,
}

/// Outcome of an expiry run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpireResult {
    pub today: NaiveDate,
    pub expired: usize,
}

fn check_group_name(name: &Option<String>) -> Result<(), ApiError> {
    match name {
        Some(name) if name.chars().count() > MAX_GROUP_NAME_LEN => Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_NAME",
            format!("Group name must be at most {} characters", MAX_GROUP_NAME_LEN),
        )),
        _ => Ok(()),
    }
}

/// List users, optionally by role
#[utoipa::path(
    get,
    path = "/admin/users/",
    tag = "admin",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserDto>>),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 403, description = "Not staff", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn list_users(
    State(state): State<AppState>,
    _staff: StaffUser,
    Valid(Query(query)): Valid<Query<UserListQuery>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(50);

    let select = match query.role.as_deref() {
        Some(role) => Role::from_str(role)
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, "INVALID_ROLE", e.to_string()))?
            .find(),
        None => custom_user::Entity::find(),
    };
    debug!("Listing users - role: {:?}, page: {}, limit: {}", query.role, page, limit);

    let users = select
        .order_by_asc(custom_user::Column::Id)
        .paginate(&state.db, limit)
        .fetch_page(page - 1)
        .await
        .map_err(|e| accounts_error(e.into()))?;

    Ok(Json(ApiResponse::ok(
        users.iter().map(staff_user_dto).collect(),
        "Users retrieved successfully",
    )))
}

/// Get a user
#[utoipa::path(
    get,
    path = "/admin/users/{user_id}/",
    tag = "admin",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserDto>),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn get_user(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = users::get_user(&state.db, user_id)
        .await
        .map_err(accounts_error)?;
    Ok(Json(ApiResponse::ok(staff_user_dto(&user), "User retrieved successfully")))
}

/// Edit a user's profile, flags and staff memo
#[utoipa::path(
    patch,
    path = "/admin/users/{user_id}/",
    tag = "admin",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = AdminUserUpdateRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserDto>),
        (status = 400, description = "Field too long"),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, staff, request), fields(staff_id = staff.0.id))]
pub async fn update_user(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(user_id): Path<i32>,
    Valid(Json(request)): Valid<Json<AdminUserUpdateRequest>>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = users::get_user(&state.db, user_id)
        .await
        .map_err(accounts_error)?;
    let user = users::update_admin_fields(&state.db, user, request.into())
        .await
        .map_err(accounts_error)?;
    state.user_cache.invalidate(&user.id).await;

    info!("Staff {} updated user {}", staff.0.id, user.id);
    Ok(Json(ApiResponse::ok(staff_user_dto(&user), "User updated successfully")))
}

/// Put a user into a teacher group, or clear it with null
#[utoipa::path(
    put,
    path = "/admin/users/{user_id}/teacher-group/",
    tag = "admin",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = TeacherGroupAssignment,
    responses(
        (status = 200, description = "Group assigned", body = ApiResponse<UserDto>),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "User or group not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn set_teacher_group(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(user_id): Path<i32>,
    Json(request): Json<TeacherGroupAssignment>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = teacher_groups::assign(&state.db, user_id, request.teacher_group_id)
        .await
        .map_err(accounts_error)?;
    state.user_cache.invalidate(&user.id).await;
    Ok(Json(ApiResponse::ok(staff_user_dto(&user), "Teacher group assigned successfully")))
}

/// Withdraw a user's account
#[utoipa::path(
    post,
    path = "/admin/users/{user_id}/withdraw/",
    tag = "admin",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account withdrawn", body = ApiResponse<UserDto>),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, staff), fields(staff_id = staff.0.id))]
pub async fn withdraw_user(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = users::get_user(&state.db, user_id)
        .await
        .map_err(accounts_error)?;
    let user = users::withdraw(&state.db, user)
        .await
        .map_err(accounts_error)?;
    state.user_cache.invalidate(&user.id).await;

    warn!("Staff {} withdrew user {}", staff.0.id, user.id);
    Ok(Json(ApiResponse::ok(staff_user_dto(&user), "Account withdrawn successfully")))
}

/// Get a user's voucher
#[utoipa::path(
    get,
    path = "/admin/users/{user_id}/voucher/",
    tag = "admin",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Voucher retrieved successfully", body = ApiResponse<VoucherDto>),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "User or voucher not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn get_user_voucher(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<VoucherDto>>, ApiError> {
    voucher_response(&state, user_id).await
}

/// Apply a balance change to a user's voucher
///
/// The body is tagged by `op`: `add`, `refund`, `expire`, `change_date`,
/// `class_used` or `class_cancel`.
#[utoipa::path(
    post,
    path = "/admin/users/{user_id}/voucher/",
    tag = "admin",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = VoucherOperation,
    responses(
        (status = 200, description = "Voucher updated", body = ApiResponse<VoucherStatementDto>),
        (status = 400, description = "Operation not allowed on the balance", body = ErrorResponse),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, staff), fields(staff_id = staff.0.id))]
pub async fn apply_voucher_operation(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(user_id): Path<i32>,
    Valid(Json(operation)): Valid<Json<VoucherOperation>>,
) -> Result<Json<ApiResponse<VoucherStatementDto>>, ApiError> {
    trace!("Applying {:?} to user {}", operation, user_id);
    let ledger = VoucherLedger::new(&state.db);
    let today = Utc::now().date_naive();

    let statement = match operation {
        VoucherOperation::Add {
            count,
            valid_days,
            purchase_date,
            name,
        } => {
            ledger
                .add(user_id, count, valid_days, purchase_date.unwrap_or(today), name)
                .await
        }
        VoucherOperation::Refund { count, name } => ledger.refund(user_id, count, name).await,
        VoucherOperation::Expire { name } => ledger.expire(user_id, name).await,
        VoucherOperation::ChangeDate {
            start_date,
            end_date,
            name,
        } => ledger.change_date(user_id, start_date, end_date, name).await,
        VoucherOperation::ClassUsed { name } => ledger.use_class(user_id, today, name).await,
        VoucherOperation::ClassCancel { name } => ledger.cancel_class(user_id, name).await,
    }
    .map_err(accounts_error)?;

    // The first operation attaches a new voucher to the user.
    state.user_cache.invalidate(&user_id).await;

    Ok(Json(ApiResponse::ok(
        voucher_statement_dto(&statement),
        "Voucher updated successfully",
    )))
}

/// Get a user's voucher history, newest first
#[utoipa::path(
    get,
    path = "/admin/users/{user_id}/voucher-history/",
    tag = "admin",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<VoucherHistoryDto>>),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn get_user_voucher_history(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<VoucherHistoryDto>>>, ApiError> {
    users::get_user(&state.db, user_id)
        .await
        .map_err(accounts_error)?;
    let history = vouchers::history_for_user(&state.db, user_id)
        .await
        .map_err(accounts_error)?;
    Ok(Json(ApiResponse::ok(
        history.iter().map(voucher_history_dto).collect(),
        "Voucher history retrieved successfully",
    )))
}

/// List teacher groups
#[utoipa::path(
    get,
    path = "/admin/teacher-groups/",
    tag = "admin",
    responses(
        (status = 200, description = "Groups retrieved successfully", body = ApiResponse<Vec<TeacherGroupDto>>),
        (status = 403, description = "Not staff", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn list_teacher_groups(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Result<Json<ApiResponse<Vec<TeacherGroupDto>>>, ApiError> {
    let groups = teacher_groups::list(&state.db)
        .await
        .map_err(accounts_error)?;
    Ok(Json(ApiResponse::ok(
        groups.iter().map(teacher_group_dto).collect(),
        "Teacher groups retrieved successfully",
    )))
}

/// Create a teacher group
#[utoipa::path(
    post,
    path = "/admin/teacher-groups/",
    tag = "admin",
    request_body = TeacherGroupRequest,
    responses(
        (status = 201, description = "Group created", body = ApiResponse<TeacherGroupDto>),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 403, description = "Not staff", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn create_teacher_group(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(request): Json<TeacherGroupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TeacherGroupDto>>), ApiError> {
    check_group_name(&request.name)?;
    let group = teacher_groups::create(&state.db, request.name)
        .await
        .map_err(accounts_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            teacher_group_dto(&group),
            "Teacher group created successfully",
        )),
    ))
}

/// Rename a teacher group
#[utoipa::path(
    patch,
    path = "/admin/teacher-groups/{group_id}/",
    tag = "admin",
    params(("group_id" = i32, Path, description = "Teacher group ID")),
    request_body = TeacherGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = ApiResponse<TeacherGroupDto>),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn update_teacher_group(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(group_id): Path<i32>,
    Json(request): Json<TeacherGroupRequest>,
) -> Result<Json<ApiResponse<TeacherGroupDto>>, ApiError> {
    check_group_name(&request.name)?;
    let group = teacher_groups::rename(&state.db, group_id, request.name)
        .await
        .map_err(accounts_error)?;
    Ok(Json(ApiResponse::ok(
        teacher_group_dto(&group),
        "Teacher group updated successfully",
    )))
}

/// List the members of a teacher group
#[utoipa::path(
    get,
    path = "/admin/teacher-groups/{group_id}/members/",
    tag = "admin",
    params(("group_id" = i32, Path, description = "Teacher group ID")),
    responses(
        (status = 200, description = "Members retrieved successfully", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn list_teacher_group_members(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(group_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let members = teacher_groups::members(&state.db, group_id)
        .await
        .map_err(accounts_error)?;
    debug!("Teacher group {} has {} members", group_id, members.len());
    Ok(Json(ApiResponse::ok(
        members.iter().map(staff_user_dto).collect(),
        "Teacher group members retrieved successfully",
    )))
}

/// Delete a teacher group; its members keep their accounts without a group
#[utoipa::path(
    delete,
    path = "/admin/teacher-groups/{group_id}/",
    tag = "admin",
    params(("group_id" = i32, Path, description = "Teacher group ID")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 403, description = "Not staff", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, _staff))]
pub async fn delete_teacher_group(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(group_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    teacher_groups::delete(&state.db, group_id)
        .await
        .map_err(accounts_error)?;
    // Cached members still point at the deleted group.
    state.user_cache.invalidate_all();
    Ok(StatusCode::NO_CONTENT)
}

/// Expire every voucher whose window ended before `today`
#[utoipa::path(
    post,
    path = "/admin/vouchers/expire/",
    tag = "admin",
    params(ExpireQuery),
    responses(
        (status = 200, description = "Expiry run finished", body = ApiResponse<ExpireResult>),
        (status = 403, description = "Not staff", body = ErrorResponse)
    ),
    security(("jwt" = []))
)]
#[instrument(skip(state, staff), fields(staff_id = staff.0.id))]
pub async fn expire_vouchers(
    State(state): State<AppState>,
    staff: StaffUser,
    Query(query): Query<ExpireQuery>,
) -> Result<Json<ApiResponse<ExpireResult>>, ApiError> {
    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());
    let expired = VoucherLedger::new(&state.db)
        .expire_due(today)
        .await
        .map_err(accounts_error)?;

    info!("Staff {} expired {} vouchers", staff.0.id, expired);
    Ok(Json(ApiResponse::ok(
        ExpireResult { today, expired },
        "Vouchers expired successfully",
    )))
}
