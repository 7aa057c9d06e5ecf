//! Password hashing and verification (argon2id, PHC string format).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use std::sync::OnceLock;

use crate::error::{AuthError, Result};

#[cfg(test)]
thread_local! {
    /// Verifications run on this thread.
    pub(crate) static VERIFY_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Hash a password; returns `$argon2id$v=19$m=...,t=...,p=...$salt$hash`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored hash.
///
/// `Ok(false)` means the password did not match; `Err` means the stored hash
/// itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    #[cfg(test)]
    VERIFY_CALLS.with(|calls| calls.set(calls.get() + 1));

    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(format!("invalid password hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswordHash(e.to_string())),
    }
}

/// Spend the cost of one verification when there is no stored hash, so a
/// login for an unknown mobile takes as long as a wrong password.
pub fn verify_without_user(password: &str) {
    match DUMMY_HASH.get_or_init(|| hash_password("unused-dummy-password").ok()) {
        Some(hash) => {
            let _ = verify_password(password, hash);
        }
        None => {
            let _ = hash_password(password);
        }
    }
}
