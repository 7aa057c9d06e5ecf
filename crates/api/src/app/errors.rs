//! Consistent error responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}`,
//! plus a `fields` map for field-level validation and conflicts.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use catalog_auth::{AuthError, AuthzError};
use catalog_core::{DomainError, FieldErrors, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or failing fields.
    #[error("{message}")]
    Validation {
        message: String,
        fields: Option<FieldErrors>,
    },

    /// Login rejected. One message for every cause.
    #[error("Unable to authenticate with provided credentials")]
    AuthenticationFailed,

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("Given token not valid for any token type")]
    TokenNotValid,

    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    #[error("Not found.")]
    NotFound,

    #[error("Method not allowed.")]
    MethodNotAllowed,

    #[error("{message}")]
    Conflict { message: String, fields: FieldErrors },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed | Self::NotAuthenticated | Self::TokenNotValid => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::AuthenticationFailed => "authentication_failed",
            Self::NotAuthenticated => "not_authenticated",
            Self::TokenNotValid => "token_not_valid",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::Conflict { .. } => "conflict",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A body that could not be decoded into the expected shape.
    pub fn invalid_body(detail: impl core::fmt::Display) -> Self {
        Self::Validation {
            message: format!("Invalid request body: {detail}"),
            fields: None,
        }
    }

    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { fields, .. } => fields.as_ref(),
            Self::Conflict { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(fields: FieldErrors) -> Self {
        Self::Validation {
            message: format!("validation failed: {fields}"),
            fields: Some(fields),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { ref field, .. } => Self::Conflict {
                fields: FieldErrors::single(field.clone(), err.to_string()),
                message: err.to_string(),
            },
            StoreError::MissingReference { ref field } => Self::Validation {
                fields: Some(FieldErrors::single(field.clone(), err.to_string())),
                message: err.to_string(),
            },
            StoreError::NotFound => Self::NotFound,
            StoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(fields) => fields.into(),
            AuthError::InvalidCredentials => Self::AuthenticationFailed,
            AuthError::InvalidToken(_) | AuthError::UserUnavailable => Self::TokenNotValid,
            AuthError::PasswordHash(msg) => Self::Internal(msg),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => fields.into(),
            // Ids only arrive in paths; one that does not parse names nothing.
            DomainError::InvalidId(_) => Self::NotFound,
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAuthenticated => Self::NotAuthenticated,
            AuthzError::PermissionDenied => Self::PermissionDenied,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub error: &'static str,
    /// Error message (human-readable)
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let Self::Internal(ref detail) = self {
            tracing::error!(error_message = %detail, "internal error");
        }

        // Internal details stay in the log.
        let message = match self {
            Self::Internal(_) => "internal server error".to_string(),
            ref other => other.to_string(),
        };
        let body = ErrorResponse {
            error: self.code(),
            message,
            fields: self.fields().cloned(),
        };

        tracing::warn!(
            error_code = body.error,
            error_message = %body.message,
            status = %status,
            "API error"
        );

        let mut response = (status, Json(body)).into_response();
        if matches!(self, Self::NotAuthenticated | Self::TokenNotValid) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(r#"Bearer realm="api""#));
        }
        response
    }
}

/// Result type for API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_http_semantics() {
        let conflict = ApiError::from(StoreError::duplicate("variant", "SKU"));
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            conflict.fields().and_then(|f| f.get("SKU")).map(<[String]>::len),
            Some(1)
        );

        let missing = ApiError::from(StoreError::missing_reference("brand"));
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.code(), "validation_error");

        assert_eq!(ApiError::from(StoreError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(DomainError::invalid_id("not-a-uuid")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::backend("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_keep_failures_generic() {
        let login = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(login.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(login.code(), "authentication_failed");
        assert_eq!(login.to_string(), catalog_auth::error::INVALID_CREDENTIALS);

        assert_eq!(ApiError::from(AuthError::UserUnavailable).code(), "token_not_valid");
    }

    #[test]
    fn authz_errors_split_401_and_403() {
        assert_eq!(
            ApiError::from(AuthzError::NotAuthenticated).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthzError::PermissionDenied).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn unauthenticated_responses_carry_a_challenge() {
        let response = ApiError::NotAuthenticated.into_response();
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let response = ApiError::PermissionDenied.into_response();
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
