use accounts::AccountsError;
use axum::{http::StatusCode, response::Json};
use common::ErrorResponse;
use tracing::{error, warn};

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }),
    )
}

pub fn not_authenticated() -> ApiError {
    api_error(
        StatusCode::UNAUTHORIZED,
        "NOT_AUTHENTICATED",
        "Authentication credentials were not provided.",
    )
}

pub fn permission_denied() -> ApiError {
    api_error(
        StatusCode::FORBIDDEN,
        "PERMISSION_DENIED",
        "You do not have permission to perform this action.",
    )
}

fn status_of(err: &AccountsError) -> StatusCode {
    match err {
        AccountsError::Database(_) | AccountsError::PasswordHash(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AccountsError::DuplicateEmail(_) => StatusCode::CONFLICT,
        AccountsError::UserNotFound(_) | AccountsError::TeacherGroupNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        AccountsError::InvalidCredentials
        | AccountsError::InactiveUser
        | AccountsError::InvalidToken(_)
        | AccountsError::TokenExpired
        | AccountsError::RefreshExpired => StatusCode::UNAUTHORIZED,
        AccountsError::MissingEmail
        | AccountsError::SuperuserRequiresStaff
        | AccountsError::SuperuserRequiresSuperuser
        | AccountsError::PasswordMismatch
        | AccountsError::RefreshDisabled
        | AccountsError::InsufficientBalance { .. }
        | AccountsError::VoucherExpired(_)
        | AccountsError::InvalidCount(_)
        | AccountsError::InvalidDateRange { .. }
        | AccountsError::InvalidMessageToken => StatusCode::BAD_REQUEST,
    }
}

/// Maps a domain error onto its HTTP response.
pub fn accounts_error(err: AccountsError) -> ApiError {
    let status = status_of(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
        return api_error(status, err.code(), "Internal server error");
    }
    warn!("Request rejected: {}", err);
    api_error(status, err.code(), err.to_string())
}
