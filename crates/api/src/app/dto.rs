//! Request/response DTOs and JSON body helpers.

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use catalog_auth::{LoginOutcome, User};
use catalog_core::FieldErrors;
use catalog_core::fields::REQUIRED;

use crate::app::errors::ApiError;

/// Decode a JSON body that was buffered before authorization ran.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(ApiError::invalid_body)
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub mobile: Option<String>,
    pub password: Option<String>,
}

impl TokenRequest {
    pub fn into_credentials(self) -> Result<(String, String), FieldErrors> {
        match (self.mobile, self.password) {
            (Some(mobile), Some(password)) => Ok((mobile, password)),
            (mobile, password) => {
                let mut errors = FieldErrors::new();
                if mobile.is_none() {
                    errors.add("mobile", REQUIRED);
                }
                if password.is_none() {
                    errors.add("password", REQUIRED);
                }
                Err(errors)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub mobile: String,
    pub name: String,
    pub refresh: String,
    pub access: String,
}

impl From<LoginOutcome> for TokenResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            mobile: outcome.user.mobile.as_str().to_owned(),
            name: outcome.user.name.as_str().to_owned(),
            refresh: outcome.tokens.refresh,
            access: outcome.tokens.access,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Public view of a user. The password never leaves the server.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub mobile: String,
    pub name: String,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            mobile: user.mobile.as_str().to_owned(),
            name: user.name.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_request_reports_every_missing_field() {
        let errors = TokenRequest {
            mobile: None,
            password: None,
        }
        .into_credentials()
        .unwrap_err();
        assert_eq!(errors.get("mobile"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("password"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn malformed_body_is_a_validation_error() {
        let err = parse_body::<TokenRequest>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(matches!(err, ApiError::Validation { fields: None, .. }));
    }
}
