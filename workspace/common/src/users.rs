use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Account as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub username: Option<String>,
    pub reservation_username: Option<String>,
    pub phone_number: Option<String>,
    /// Phone number with the domestic trunk zero restored (`+82 010...`).
    pub formatted_phone_number: Option<String>,
    pub is_kakao: bool,
    pub is_facebook: bool,
    pub is_google: bool,
    pub is_teacher: bool,
    pub is_operator: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub done_tutorial: bool,
    pub postcode: Option<String>,
    pub address: Option<String>,
    pub teacher_group_id: Option<i32>,
    pub voucher_id: Option<i32>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    /// Only present on the staff surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_memo: Option<String>,
}

/// Fields a user may change on their own profile.
///
/// Length limits follow the `users` columns.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default, Validate)]
pub struct UpdateProfileRequest {
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
}

/// Public view of a teacher.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TeacherDto {
    pub id: i32,
    pub username: Option<String>,
    pub teacher_group_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TeacherGroupDto {
    pub id: i32,
    pub name: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct TeacherGroupRequest {
    pub name: Option<String>,
}

/// Moves a user into a group, or out of any group with `null`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct TeacherGroupAssignment {
    pub teacher_group_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MessageTokenRequest {
    pub fcm_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MessageTokenDto {
    pub id: i32,
    pub fcm_token: String,
    pub created: DateTime<Utc>,
}
