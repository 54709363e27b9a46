//! Transport-layer types of the booking API.
//! Handlers serialize these and API clients (and the integration tests)
//! deserialize them, so both sides agree on one shape.

mod auth;
mod users;
mod vouchers;

pub use auth::{
    LoginResponse, ObtainTokenRequest, PasswordChangeRequest, TokenRequest, TokenResponse,
};
pub use users::{
    MessageTokenDto, MessageTokenRequest, TeacherDto, TeacherGroupAssignment, TeacherGroupDto,
    TeacherGroupRequest, UpdateProfileRequest, UserDto,
};
pub use vouchers::{
    MAX_ENTRY_NAME_LEN, MAX_OPERATION_COUNT, MAX_VALID_DAYS, VoucherDto, VoucherHistoryDto,
    VoucherOperation, VoucherStatementDto,
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Machine readable error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Plain `{"detail": ...}` acknowledgement used by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DetailResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_shape() {
        let response = ApiResponse::ok(vec![1, 2], "Listed");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["message"], "Listed");
        assert_eq!(json["success"], true);
    }
}
