//! Stateless API tokens.
//!
//! Tokens carry the user id and email, an expiry and, when refreshing is
//! allowed, the time the original token was issued (`orig_iat`). Refreshing
//! keeps `orig_iat`, so a chain of refreshes ends once the refresh window
//! counted from the first login has passed.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use model::entities::custom_user;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::error::{AccountsError, Result};

pub const DEFAULT_EXPIRATION_SECS: i64 = 300;
pub const DEFAULT_REFRESH_EXPIRATION_SECS: i64 = 7 * 24 * 60 * 60;

/// Token payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i32,
    /// Login identifier, which is the email address.
    pub username: String,
    pub email: String,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Issue time of the first token of a refresh chain (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_iat: Option<i64>,
}

/// Lifetimes and refresh policy of issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JwtPolicy {
    pub expiration: Duration,
    pub refresh_expiration: Duration,
    pub allow_refresh: bool,
}

impl Default for JwtPolicy {
    fn default() -> Self {
        Self {
            expiration: Duration::seconds(DEFAULT_EXPIRATION_SECS),
            refresh_expiration: Duration::seconds(DEFAULT_REFRESH_EXPIRATION_SECS),
            allow_refresh: true,
        }
    }
}

/// Issues and checks HS256 tokens.
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    policy: JwtPolicy,
}

impl fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuth")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl JwtAuth {
    pub fn new(secret: &[u8], policy: JwtPolicy) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            policy,
        }
    }

    pub fn policy(&self) -> &JwtPolicy {
        &self.policy
    }

    /// Builds the claims of a fresh login for `user`.
    pub fn claims_for(&self, user: &custom_user::Model) -> Claims {
        let now = Utc::now();
        Claims {
            user_id: user.id,
            username: user.email.clone(),
            email: user.email.clone(),
            exp: (now + self.policy.expiration).timestamp(),
            orig_iat: self.policy.allow_refresh.then(|| now.timestamp()),
        }
    }

    pub fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AccountsError::InvalidToken(e.to_string()))
    }

    /// Decodes a token, rejecting bad signatures and expired tokens.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AccountsError::TokenExpired,
                _ => AccountsError::InvalidToken(e.to_string()),
            })
    }

    /// Issues a token for `user`.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub fn issue(&self, user: &custom_user::Model) -> Result<String> {
        self.encode(&self.claims_for(user))
    }

    /// Returns the claims of a valid token.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.decode(token)
    }

    /// Exchanges a valid token for a new one with a fresh expiry.
    ///
    /// The new token keeps `orig_iat`; once `orig_iat + refresh_expiration`
    /// has passed the token cannot be refreshed any more.
    #[instrument(skip(self, token))]
    pub fn refresh(&self, token: &str) -> Result<(Claims, String)> {
        if !self.policy.allow_refresh {
            return Err(AccountsError::RefreshDisabled);
        }

        let claims = self.decode(token)?;
        let orig_iat = claims.orig_iat.ok_or_else(|| {
            AccountsError::InvalidToken("orig_iat field is required.".to_string())
        })?;

        let now = Utc::now();
        let refresh_limit = orig_iat + self.policy.refresh_expiration.num_seconds();
        if now.timestamp() > refresh_limit {
            warn!(user_id = claims.user_id, "Refresh window has passed");
            return Err(AccountsError::RefreshExpired);
        }

        let refreshed = Claims {
            exp: (now + self.policy.expiration).timestamp(),
            orig_iat: Some(orig_iat),
            ..claims
        };
        debug!(user_id = refreshed.user_id, "Refreshed token");
        let token = self.encode(&refreshed)?;
        Ok((refreshed, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> custom_user::Model {
        custom_user::Model {
            id: 7,
            password: "!".to_string(),
            last_login: None,
            is_superuser: false,
            username: Some("kim".to_string()),
            reservation_username: None,
            email: "kim@example.com".to_string(),
            phone_number: None,
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
            is_kakao: true,
            is_facebook: false,
            is_google: false,
            is_teacher: false,
            is_operator: false,
            done_tutorial: false,
            postcode: None,
            address: None,
            teacher_group_id: None,
            voucher_id: None,
            staff_memo: String::new(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let jwt = JwtAuth::new(b"secret", JwtPolicy::default());
        let token = jwt.issue(&user()).unwrap();
        assert_eq!(token.matches('.').count(), 2);

        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "kim@example.com");
        assert!(claims.orig_iat.is_some());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtAuth::new(b"secret", JwtPolicy::default())
            .issue(&user())
            .unwrap();
        let other = JwtAuth::new(b"other", JwtPolicy::default());
        assert!(matches!(other.verify(&token), Err(AccountsError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtAuth::new(b"secret", JwtPolicy::default());
        let mut claims = jwt.claims_for(&user());
        claims.exp = Utc::now().timestamp() - 10;
        let token = jwt.encode(&claims).unwrap();
        assert!(matches!(jwt.verify(&token), Err(AccountsError::TokenExpired)));
    }

    #[test]
    fn test_refresh_keeps_orig_iat() {
        let jwt = JwtAuth::new(b"secret", JwtPolicy::default());
        let mut claims = jwt.claims_for(&user());
        let orig_iat = Utc::now().timestamp() - 3600;
        claims.orig_iat = Some(orig_iat);
        let token = jwt.encode(&claims).unwrap();

        let (refreshed, new_token) = jwt.refresh(&token).unwrap();
        assert_eq!(refreshed.orig_iat, Some(orig_iat));
        assert_eq!(jwt.verify(&new_token).unwrap().orig_iat, Some(orig_iat));
    }

    #[test]
    fn test_refresh_window_expires() {
        let jwt = JwtAuth::new(b"secret", JwtPolicy::default());
        let mut claims = jwt.claims_for(&user());
        claims.orig_iat = Some(Utc::now().timestamp() - DEFAULT_REFRESH_EXPIRATION_SECS - 1);
        let token = jwt.encode(&claims).unwrap();
        assert!(matches!(jwt.refresh(&token), Err(AccountsError::RefreshExpired)));
    }

    #[test]
    fn test_refresh_disabled() {
        let policy = JwtPolicy {
            allow_refresh: false,
            ..JwtPolicy::default()
        };
        let jwt = JwtAuth::new(b"secret", policy);
        let token = jwt.issue(&user()).unwrap();
        assert!(jwt.verify(&token).unwrap().orig_iat.is_none());
        assert!(matches!(jwt.refresh(&token), Err(AccountsError::RefreshDisabled)));
    }
}
