//! Account creation, authentication and withdrawal.

use chrono::Utc;
use model::entities::custom_user::{self, Column, Entity as CustomUser};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, SqlErr,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{AccountsError, Result};
use crate::password::{hash_password, make_unusable_password, verify_password};

/// Username given to withdrawn accounts.
pub const WITHDRAWN_USERNAME: &str = "탈퇴한유저";
/// Domain of the placeholder emails of withdrawn accounts.
pub const WITHDRAWN_EMAIL_DOMAIN: &str = "thelapis.io";
/// Placeholder written over withdrawn credentials and contact fields.
const WITHDRAWN_PLACEHOLDER: &str = "-";

/// Fields of an account to create.
///
/// `is_staff` and `is_superuser` are left unset to take the defaults of
/// [`create_user`] (false) or [`create_superuser`] (true).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: Option<String>,
    pub username: Option<String>,
    pub reservation_username: Option<String>,
    pub phone_number: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_kakao: bool,
    pub is_facebook: bool,
    pub is_google: bool,
    pub is_teacher: bool,
    pub is_operator: bool,
    pub postcode: Option<String>,
    pub address: Option<String>,
    pub teacher_group_id: Option<i32>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password: Option<&str>) -> Self {
        Self {
            email: email.into(),
            password: password.map(str::to_string),
            ..Default::default()
        }
    }
}

/// Profile fields a user may edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub reservation_username: Option<String>,
    pub phone_number: Option<String>,
    pub postcode: Option<String>,
    pub address: Option<String>,
    pub done_tutorial: Option<bool>,
}

/// Fields only staff may edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminUpdate {
    pub profile: ProfileUpdate,
    pub is_active: Option<bool>,
    pub is_teacher: Option<bool>,
    pub is_operator: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub staff_memo: Option<String>,
}

/// Normalizes an email address by lowercasing its domain part.
///
/// The local part is kept as given since mail servers may treat it case
/// sensitively.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Creates a regular account; staff and superuser flags default to false.
#[instrument(skip(db, new_user), fields(email = %new_user.email))]
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    new_user: NewUser,
) -> Result<custom_user::Model> {
    let is_staff = new_user.is_staff.unwrap_or(false);
    let is_superuser = new_user.is_superuser.unwrap_or(false);
    insert_user(db, new_user, is_staff, is_superuser).await
}

/// Creates a superuser; both staff and superuser flags must end up true.
#[instrument(skip(db, new_user), fields(email = %new_user.email))]
pub async fn create_superuser<C: ConnectionTrait>(
    db: &C,
    new_user: NewUser,
) -> Result<custom_user::Model> {
    let is_staff = new_user.is_staff.unwrap_or(true);
    let is_superuser = new_user.is_superuser.unwrap_or(true);

    if !is_staff {
        return Err(AccountsError::SuperuserRequiresStaff);
    }
    if !is_superuser {
        return Err(AccountsError::SuperuserRequiresSuperuser);
    }

    insert_user(db, new_user, is_staff, is_superuser).await
}

async fn insert_user<C: ConnectionTrait>(
    db: &C,
    new_user: NewUser,
    is_staff: bool,
    is_superuser: bool,
) -> Result<custom_user::Model> {
    if new_user.email.trim().is_empty() {
        return Err(AccountsError::MissingEmail);
    }
    let email = normalize_email(&new_user.email);

    if find_by_email(db, &email).await?.is_some() {
        warn!("Email {} is already registered", email);
        return Err(AccountsError::DuplicateEmail(email));
    }

    let password = match new_user.password.as_deref() {
        Some(raw) => hash_password(raw)?,
        None => make_unusable_password(),
    };

    let user = custom_user::ActiveModel {
        password: Set(password),
        last_login: Set(None),
        is_superuser: Set(is_superuser),
        username: Set(new_user.username),
        reservation_username: Set(new_user.reservation_username),
        email: Set(email.clone()),
        phone_number: Set(new_user.phone_number),
        is_staff: Set(is_staff),
        is_active: Set(true),
        date_joined: Set(Utc::now()),
        is_kakao: Set(new_user.is_kakao),
        is_facebook: Set(new_user.is_facebook),
        is_google: Set(new_user.is_google),
        is_teacher: Set(new_user.is_teacher),
        is_operator: Set(new_user.is_operator),
        done_tutorial: Set(false),
        postcode: Set(new_user.postcode),
        address: Set(new_user.address),
        teacher_group_id: Set(new_user.teacher_group_id),
        voucher_id: Set(None),
        staff_memo: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| insert_error(err, &email))?;

    info!(user_id = user.id, "Created user {}", user.email);
    Ok(user)
}

/// A concurrent sign-up can pass the lookup above and lose on the unique
/// index instead.
fn insert_error(err: DbErr, email: &str) -> AccountsError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!("Email {} was registered concurrently", email);
            AccountsError::DuplicateEmail(email.to_string())
        }
        _ => err.into(),
    }
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<custom_user::Model>> {
    Ok(CustomUser::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

pub async fn get_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<custom_user::Model> {
    CustomUser::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AccountsError::UserNotFound(user_id))
}

/// Checks credentials and returns the matching active account.
#[instrument(skip(db, password))]
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> Result<custom_user::Model> {
    let user = match find_by_email(db, email).await? {
        Some(user) => user,
        None => {
            debug!("No account for {}", email);
            return Err(AccountsError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password) {
        debug!(user_id = user.id, "Password mismatch");
        return Err(AccountsError::InvalidCredentials);
    }
    if !user.is_active {
        return Err(AccountsError::InactiveUser);
    }

    Ok(user)
}

pub async fn set_password<C: ConnectionTrait>(
    db: &C,
    user: custom_user::Model,
    raw_password: &str,
) -> Result<custom_user::Model> {
    let mut active = user.into_active_model();
    active.password = Set(hash_password(raw_password)?);
    Ok(active.update(db).await?)
}

/// Replaces the password after checking the current one.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn change_password<C: ConnectionTrait>(
    db: &C,
    user: custom_user::Model,
    old_password: &str,
    new_password1: &str,
    new_password2: &str,
) -> Result<custom_user::Model> {
    if !verify_password(old_password, &user.password) {
        return Err(AccountsError::InvalidCredentials);
    }
    if new_password1 != new_password2 {
        return Err(AccountsError::PasswordMismatch);
    }
    let user = set_password(db, user, new_password1).await?;
    info!(user_id = user.id, "Password changed");
    Ok(user)
}

pub async fn touch_last_login<C: ConnectionTrait>(
    db: &C,
    user: custom_user::Model,
) -> Result<custom_user::Model> {
    let mut active = user.into_active_model();
    active.last_login = Set(Some(Utc::now()));
    Ok(active.update(db).await?)
}

fn apply_profile(active: &mut custom_user::ActiveModel, update: ProfileUpdate) {
    if let Some(username) = update.username {
        active.username = Set(Some(username));
    }
    if let Some(reservation_username) = update.reservation_username {
        active.reservation_username = Set(Some(reservation_username));
    }
    if let Some(phone_number) = update.phone_number {
        active.phone_number = Set(Some(phone_number));
    }
    if let Some(postcode) = update.postcode {
        active.postcode = Set(Some(postcode));
    }
    if let Some(address) = update.address {
        active.address = Set(Some(address));
    }
    if let Some(done_tutorial) = update.done_tutorial {
        active.done_tutorial = Set(done_tutorial);
    }
}

#[instrument(skip(db, user), fields(user_id = user.id))]
pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    user: custom_user::Model,
    update: ProfileUpdate,
) -> Result<custom_user::Model> {
    let mut active = user.into_active_model();
    apply_profile(&mut active, update);
    Ok(active.update(db).await?)
}

#[instrument(skip(db, user), fields(user_id = user.id))]
pub async fn update_admin_fields<C: ConnectionTrait>(
    db: &C,
    user: custom_user::Model,
    update: AdminUpdate,
) -> Result<custom_user::Model> {
    let mut active = user.into_active_model();
    apply_profile(&mut active, update.profile);
    if let Some(is_active) = update.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_teacher) = update.is_teacher {
        active.is_teacher = Set(is_teacher);
    }
    if let Some(is_operator) = update.is_operator {
        active.is_operator = Set(is_operator);
    }
    if let Some(is_staff) = update.is_staff {
        active.is_staff = Set(is_staff);
    }
    if let Some(is_superuser) = update.is_superuser {
        active.is_superuser = Set(is_superuser);
    }
    if let Some(staff_memo) = update.staff_memo {
        active.staff_memo = Set(staff_memo);
    }
    Ok(active.update(db).await?)
}

/// Anonymizes an account in place.
///
/// Name, email, password, phone and address are overwritten; the row, its
/// primary key, flags and relations stay so that bookings and the voucher
/// ledger keep pointing at it.
#[instrument(skip(db, user), fields(user_id = user.id))]
pub async fn withdraw<C: ConnectionTrait>(
    db: &C,
    user: custom_user::Model,
) -> Result<custom_user::Model> {
    let user_id = user.id;
    let mut active = user.into_active_model();
    active.username = Set(Some(WITHDRAWN_USERNAME.to_string()));
    active.reservation_username = Set(Some(WITHDRAWN_PLACEHOLDER.to_string()));
    active.email = Set(format!("deleted{}@{}", user_id, WITHDRAWN_EMAIL_DOMAIN));
    active.password = Set(WITHDRAWN_PLACEHOLDER.to_string());
    active.phone_number = Set(Some(WITHDRAWN_PLACEHOLDER.to_string()));
    active.address = Set(None);
    active.postcode = Set(None);

    let user = active.update(db).await?;
    info!(user_id, "User withdrew");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_db;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("Kim.Lee@Example.COM"), "Kim.Lee@example.com");
        assert_eq!(normalize_email("  a@B.io "), "a@b.io");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[tokio::test]
    async fn test_create_user_requires_email() {
        let db = setup_db().await;
        let result = create_user(&db, NewUser::new("", Some("pw"))).await;
        assert!(matches!(result, Err(AccountsError::MissingEmail)));
        let result = create_user(&db, NewUser::new("   ", Some("pw"))).await;
        assert!(matches!(result, Err(AccountsError::MissingEmail)));
    }

    #[tokio::test]
    async fn test_create_user_defaults() {
        let db = setup_db().await;
        let user = create_user(&db, NewUser::new("Kim@Example.com", Some("pw")))
            .await
            .unwrap();
        assert_eq!(user.email, "Kim@example.com");
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert!(user.is_active);
        assert!(verify_password("pw", &user.password));
    }

    #[tokio::test]
    async fn test_create_user_without_password_is_unusable() {
        let db = setup_db().await;
        let user = create_user(&db, NewUser::new("social@example.com", None))
            .await
            .unwrap();
        assert!(user.password.starts_with('!'));
        assert!(matches!(
            authenticate(&db, "social@example.com", "").await,
            Err(AccountsError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = setup_db().await;
        create_user(&db, NewUser::new("dup@example.com", None)).await.unwrap();
        let result = create_user(&db, NewUser::new("dup@EXAMPLE.com", None)).await;
        assert!(matches!(result, Err(AccountsError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_unique_index_violation_reads_as_duplicate() {
        let db = setup_db().await;
        let existing = create_user(&db, NewUser::new("race@example.com", None))
            .await
            .unwrap();

        // Same row again, skipping the lookup in insert_user
        let mut duplicate = existing.into_active_model().reset_all();
        duplicate.id = sea_orm::ActiveValue::NotSet;
        let err = duplicate.insert(&db).await.unwrap_err();

        assert!(matches!(
            insert_error(err, "race@example.com"),
            AccountsError::DuplicateEmail(email) if email == "race@example.com"
        ));
    }

    #[tokio::test]
    async fn test_create_superuser_flags() {
        let db = setup_db().await;
        let admin = create_superuser(&db, NewUser::new("admin@example.com", Some("pw")))
            .await
            .unwrap();
        assert!(admin.is_staff && admin.is_superuser);

        let mut not_staff = NewUser::new("a@example.com", Some("pw"));
        not_staff.is_staff = Some(false);
        assert!(matches!(
            create_superuser(&db, not_staff).await,
            Err(AccountsError::SuperuserRequiresStaff)
        ));

        let mut not_superuser = NewUser::new("b@example.com", Some("pw"));
        not_superuser.is_superuser = Some(false);
        assert!(matches!(
            create_superuser(&db, not_superuser).await,
            Err(AccountsError::SuperuserRequiresSuperuser)
        ));
        assert!(find_by_email(&db, "b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = setup_db().await;
        let user = create_user(&db, NewUser::new("login@example.com", Some("secret")))
            .await
            .unwrap();

        let found = authenticate(&db, "login@EXAMPLE.com", "secret").await.unwrap();
        assert_eq!(found.id, user.id);
        assert!(matches!(
            authenticate(&db, "login@example.com", "wrong").await,
            Err(AccountsError::InvalidCredentials)
        ));

        let update = AdminUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        update_admin_fields(&db, user, update).await.unwrap();
        assert!(matches!(
            authenticate(&db, "login@example.com", "secret").await,
            Err(AccountsError::InactiveUser)
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let db = setup_db().await;
        let user = create_user(&db, NewUser::new("pw@example.com", Some("old")))
            .await
            .unwrap();

        let result = change_password(&db, user.clone(), "nope", "new", "new").await;
        assert!(matches!(result, Err(AccountsError::InvalidCredentials)));
        let result = change_password(&db, user.clone(), "old", "new", "other").await;
        assert!(matches!(result, Err(AccountsError::PasswordMismatch)));

        change_password(&db, user, "old", "new", "new").await.unwrap();
        assert!(authenticate(&db, "pw@example.com", "new").await.is_ok());
    }

    #[tokio::test]
    async fn test_withdraw_anonymizes_in_place() {
        let db = setup_db().await;
        let mut new_user = NewUser::new("leaving@example.com", Some("pw"));
        new_user.username = Some("Kim".to_string());
        new_user.reservation_username = Some("Kim Minsu".to_string());
        new_user.phone_number = Some("+821012345678".to_string());
        new_user.address = Some("Seoul".to_string());
        new_user.postcode = Some("04524".to_string());
        new_user.is_kakao = true;
        let user = create_user(&db, new_user).await.unwrap();
        let user_id = user.id;

        let withdrawn = withdraw(&db, user).await.unwrap();
        assert_eq!(withdrawn.id, user_id);
        assert_eq!(withdrawn.username.as_deref(), Some(WITHDRAWN_USERNAME));
        assert_eq!(withdrawn.reservation_username.as_deref(), Some("-"));
        assert_eq!(withdrawn.email, format!("deleted{}@thelapis.io", user_id));
        assert_eq!(withdrawn.password, "-");
        assert_eq!(withdrawn.phone_number.as_deref(), Some("-"));
        assert_eq!(withdrawn.address, None);
        assert_eq!(withdrawn.postcode, None);
        assert!(withdrawn.is_kakao);

        let stored = get_user(&db, user_id).await.unwrap();
        assert_eq!(stored.email, withdrawn.email);
        assert_eq!(stored.username, withdrawn.username);
        assert!(find_by_email(&db, "leaving@example.com").await.unwrap().is_none());
        assert!(authenticate(&db, &stored.email, "pw").await.is_err());
    }

    #[tokio::test]
    async fn test_update_profile_touches_given_fields() {
        let db = setup_db().await;
        let mut new_user = NewUser::new("p@example.com", None);
        new_user.username = Some("before".to_string());
        new_user.address = Some("Busan".to_string());
        let user = create_user(&db, new_user).await.unwrap();

        let update = ProfileUpdate {
            username: Some("after".to_string()),
            done_tutorial: Some(true),
            ..Default::default()
        };
        let user = update_profile(&db, user, update).await.unwrap();
        assert_eq!(user.username.as_deref(), Some("after"));
        assert_eq!(user.address.as_deref(), Some("Busan"));
        assert!(user.done_tutorial);
    }
}
