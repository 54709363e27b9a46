use accounts::JwtAuth;
use common::{
    ApiResponse, DetailResponse, ErrorResponse, LoginResponse, MessageTokenDto,
    MessageTokenRequest, ObtainTokenRequest, PasswordChangeRequest, TeacherDto,
    TeacherGroupAssignment, TeacherGroupDto, TeacherGroupRequest, TokenRequest, TokenResponse,
    UpdateProfileRequest, UserDto, VoucherDto, VoucherHistoryDto, VoucherOperation,
    VoucherStatementDto,
};
use model::entities::custom_user;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{
    Modify, OpenApi, ToSchema,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::config::Settings;
use crate::handlers::{
    admin::{AdminUserUpdateRequest, ExpireResult, UserListQuery},
    registration::RegistrationRequest,
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Authenticated users by id, invalidated whenever a handler changes one
    pub user_cache: Cache<i32, custom_user::Model>,
    pub jwt: Arc<JwtAuth>,
    pub settings: Arc<Settings>,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Runtime snapshot served by the debug endpoint
#[derive(Serialize, Deserialize)]
pub struct DebugInfo {
    pub version: String,
    pub settings: Settings,
    pub cached_users: u64,
}

struct JwtSecurity;

impl Modify for JwtSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "`JWT <token>` or `Bearer <token>`",
                ))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::jwt::obtain_token,
        crate::handlers::jwt::refresh_token,
        crate::handlers::jwt::verify_token,
        crate::handlers::rest_auth::login,
        crate::handlers::rest_auth::logout,
        crate::handlers::rest_auth::user_details,
        crate::handlers::rest_auth::update_user_details,
        crate::handlers::rest_auth::password_change,
        crate::handlers::registration::register,
        crate::handlers::users::get_me,
        crate::handlers::users::update_me,
        crate::handlers::users::withdraw_me,
        crate::handlers::users::get_my_voucher,
        crate::handlers::users::get_my_voucher_history,
        crate::handlers::users::list_teachers,
        crate::handlers::message_tokens::list_message_tokens,
        crate::handlers::message_tokens::register_message_token,
        crate::handlers::message_tokens::delete_message_token,
        crate::handlers::admin::list_users,
        crate::handlers::admin::get_user,
        crate::handlers::admin::update_user,
        crate::handlers::admin::set_teacher_group,
        crate::handlers::admin::withdraw_user,
        crate::handlers::admin::get_user_voucher,
        crate::handlers::admin::apply_voucher_operation,
        crate::handlers::admin::get_user_voucher_history,
        crate::handlers::admin::list_teacher_groups,
        crate::handlers::admin::create_teacher_group,
        crate::handlers::admin::update_teacher_group,
        crate::handlers::admin::delete_teacher_group,
        crate::handlers::admin::list_teacher_group_members,
        crate::handlers::admin::expire_vouchers,
    ),
    components(
        schemas(
            ApiResponse<UserDto>,
            ApiResponse<Vec<UserDto>>,
            ApiResponse<VoucherDto>,
            ApiResponse<Vec<VoucherHistoryDto>>,
            ApiResponse<VoucherStatementDto>,
            ApiResponse<Vec<TeacherDto>>,
            ApiResponse<TeacherGroupDto>,
            ApiResponse<Vec<TeacherGroupDto>>,
            ApiResponse<MessageTokenDto>,
            ApiResponse<Vec<MessageTokenDto>>,
            ApiResponse<ExpireResult>,
            ErrorResponse,
            DetailResponse,
            HealthResponse,
            ObtainTokenRequest,
            TokenRequest,
            TokenResponse,
            LoginResponse,
            PasswordChangeRequest,
            RegistrationRequest,
            UserDto,
            UpdateProfileRequest,
            AdminUserUpdateRequest,
            UserListQuery,
            TeacherDto,
            TeacherGroupDto,
            TeacherGroupRequest,
            TeacherGroupAssignment,
            MessageTokenRequest,
            MessageTokenDto,
            VoucherDto,
            VoucherHistoryDto,
            VoucherOperation,
            VoucherStatementDto,
            ExpireResult,
        )
    ),
    modifiers(&JwtSecurity),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Token and session endpoints"),
        (name = "users", description = "Endpoints of the signed-in user"),
        (name = "message-tokens", description = "Push notification tokens"),
        (name = "admin", description = "Staff-only management endpoints"),
    ),
    info(
        title = "Lapis API",
        description = "Class booking backend: accounts, teachers, vouchers and push tokens",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
