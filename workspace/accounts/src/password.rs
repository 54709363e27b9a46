//! Password hashing for stored credentials.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{Rng, RngCore, distributions::Alphanumeric};

use crate::error::{AccountsError, Result};

/// Prefix of passwords that can never match.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';
const UNUSABLE_PASSWORD_SUFFIX_LENGTH: usize = 40;

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AccountsError::PasswordHash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountsError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored hash.
///
/// Unusable and malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if !is_password_usable(hash) {
        return false;
    }
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Marker stored for accounts created without a password.
pub fn make_unusable_password() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UNUSABLE_PASSWORD_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, suffix)
}

pub fn is_password_usable(hash: &str) -> bool {
    !hash.starts_with(UNUSABLE_PASSWORD_PREFIX) && hash.starts_with('$')
}
