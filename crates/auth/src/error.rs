//! Authentication error types

use catalog_core::{FieldErrors, StoreError};
use thiserror::Error;

use crate::claims::TokenError;

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Unable to authenticate with provided credentials";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Submitted user fields are malformed.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Unknown mobile, wrong password or inactive account. Deliberately a
    /// single variant so callers cannot tell the cases apart.
    #[error("Unable to authenticate with provided credentials")]
    InvalidCredentials,

    /// Token failed signature, type or time checks.
    #[error("token is invalid or expired: {0}")]
    InvalidToken(#[from] TokenError),

    /// Token was valid but its user no longer exists or was deactivated.
    #[error("user not found or inactive")]
    UserUnavailable,

    /// Password hashing backend failed.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldErrors> for AuthError {
    fn from(value: FieldErrors) -> Self {
        Self::Validation(value)
    }
}
