//! Request authentication.
//!
//! Handlers take [`AuthUser`] or [`StaffUser`] as an argument to require a
//! signed-in user. The token comes from `Authorization: JWT <token>` (the
//! configured prefix) or `Authorization: Bearer <token>`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};
use model::{Role, entities::custom_user};
use tracing::{debug, trace, warn};

use crate::errors::{ApiError, accounts_error, api_error, not_authenticated, permission_denied};
use crate::schemas::AppState;

/// Extracts the token of an `Authorization` header value.
pub fn parse_authorization<'a>(header: &'a str, prefix: &str) -> Option<&'a str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    let known = scheme.eq_ignore_ascii_case(prefix) || scheme.eq_ignore_ascii_case("Bearer");
    (known && !token.is_empty()).then_some(token)
}

/// Loads a user through the cache.
pub async fn load_user(state: &AppState, user_id: i32) -> Result<custom_user::Model, ApiError> {
    if let Some(user) = state.user_cache.get(&user_id).await {
        trace!(user_id, "User cache hit");
        return Ok(user);
    }

    let user = accounts::users::get_user(&state.db, user_id)
        .await
        .map_err(accounts_error)?;
    state.user_cache.insert(user_id, user.clone()).await;
    Ok(user)
}

/// The signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub custom_user::Model);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(not_authenticated)?;
        let token = parse_authorization(header, &state.settings.jwt.auth_header_prefix)
            .ok_or_else(not_authenticated)?;

        let claims = state.jwt.verify(token).map_err(accounts_error)?;
        let user = match load_user(state, claims.user_id).await {
            Ok(user) => user,
            Err((StatusCode::NOT_FOUND, _)) => {
                warn!(user_id = claims.user_id, "Token of a missing user");
                return Err(api_error(
                    StatusCode::UNAUTHORIZED,
                    "INVALID_TOKEN",
                    "User doesn't exist.",
                ));
            }
            Err(e) => return Err(e),
        };

        if !user.is_active {
            return Err(accounts_error(accounts::AccountsError::InactiveUser));
        }

        debug!(user_id = user.id, "Authenticated");
        Ok(AuthUser(user))
    }
}

/// A signed-in staff member or superuser.
#[derive(Debug, Clone)]
pub struct StaffUser(pub custom_user::Model);

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !Role::Staff.matches(&user) {
            warn!(user_id = user.id, "Staff endpoint denied");
            return Err(permission_denied());
        }
        Ok(StaffUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authorization() {
        assert_eq!(parse_authorization("JWT abc.def.ghi", "JWT"), Some("abc.def.ghi"));
        assert_eq!(parse_authorization("Bearer abc", "JWT"), Some("abc"));
        assert_eq!(parse_authorization("bearer abc", "JWT"), Some("abc"));
        assert_eq!(parse_authorization("Token abc", "Token"), Some("abc"));
        assert_eq!(parse_authorization("Basic abc", "JWT"), None);
        assert_eq!(parse_authorization("JWT", "JWT"), None);
        assert_eq!(parse_authorization("JWT   ", "JWT"), None);
    }
}
