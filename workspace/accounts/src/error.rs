use thiserror::Error;

/// Error types for account, credential and voucher operations
#[derive(Error, Debug)]
pub enum AccountsError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("The given email must be set")]
    MissingEmail,

    #[error("Superuser must have is_staff=True.")]
    SuperuserRequiresStaff,

    #[error("Superuser must have is_superuser=True.")]
    SuperuserRequiresSuperuser,

    #[error("A user with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Unable to log in with provided credentials.")]
    InvalidCredentials,

    #[error("User account is disabled.")]
    InactiveUser,

    #[error("The two password fields didn't match.")]
    PasswordMismatch,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Error decoding signature: {0}")]
    InvalidToken(String),

    #[error("Signature has expired.")]
    TokenExpired,

    #[error("Refresh has expired.")]
    RefreshExpired,

    #[error("Token refresh is disabled.")]
    RefreshDisabled,

    #[error("Insufficient voucher balance: {available} available, {requested} requested")]
    InsufficientBalance { available: i32, requested: i32 },

    #[error("Voucher is not valid on {0}")]
    VoucherExpired(chrono::NaiveDate),

    #[error("Invalid voucher count: {0}")]
    InvalidCount(i32),

    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Teacher group {0} not found")]
    TeacherGroupNotFound(i32),

    #[error("Message token must not be empty")]
    InvalidMessageToken,
}

/// Type alias for Result with AccountsError
pub type Result<T> = std::result::Result<T, AccountsError>;

impl AccountsError {
    /// Stable machine-readable code of the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::MissingEmail => "MISSING_EMAIL",
            Self::SuperuserRequiresStaff | Self::SuperuserRequiresSuperuser => "INVALID_SUPERUSER",
            Self::DuplicateEmail(_) => "EMAIL_ALREADY_EXISTS",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InactiveUser => "INACTIVE_USER",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::PasswordHash(_) => "PASSWORD_HASH_ERROR",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::RefreshExpired => "REFRESH_EXPIRED",
            Self::RefreshDisabled => "REFRESH_DISABLED",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::VoucherExpired(_) => "VOUCHER_EXPIRED",
            Self::InvalidCount(_) => "INVALID_COUNT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::TeacherGroupNotFound(_) => "TEACHER_GROUP_NOT_FOUND",
            Self::InvalidMessageToken => "INVALID_MESSAGE_TOKEN",
        }
    }
}
