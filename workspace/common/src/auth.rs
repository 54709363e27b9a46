use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::UserDto;

/// Credentials for obtaining a token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ObtainTokenRequest {
    pub email: String,
    pub password: String,
}

/// Body of the refresh and verify endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TokenResponse {
    pub token: String,
}

/// Result of a credential login or a registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Validate)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password1: String,
    pub new_password2: String,
}
