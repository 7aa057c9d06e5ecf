//! Token minting and verification (HS256 JWTs).

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use catalog_core::UserId;

use crate::claims::{JwtClaims, TokenError, TokenType, validate_claims};

/// Lifetimes and signing secret for issued tokens.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: Vec<u8>,
    pub access_ttl: StdDuration,
    pub refresh_ttl: StdDuration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: StdDuration::from_secs(5 * 60),
            refresh_ttl: StdDuration::from_secs(24 * 60 * 60),
        }
    }

    pub fn with_access_ttl(mut self, ttl: StdDuration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: StdDuration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

impl core::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// A freshly minted refresh token and the access token derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Mints and verifies tokens with a single shared secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: StdDuration,
    refresh_ttl: StdDuration,
}

impl core::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks are done by `validate_claims` against an explicit clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(&settings.secret),
            decoding_key: DecodingKey::from_secret(&settings.secret),
            validation,
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        }
    }

    /// Mint a refresh token and an access token for `user_id`.
    pub fn issue_pair(&self, user_id: UserId, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            refresh: self.mint(user_id, TokenType::Refresh, now)?,
            access: self.mint(user_id, TokenType::Access, now)?,
        })
    }

    pub fn issue_access(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.mint(user_id, TokenType::Access, now)
    }

    /// Verify signature, type and time window; return the claims.
    pub fn verify(&self, token: &str, expected: TokenType, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        let claims = data.claims;

        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                found: claims.token_type,
            });
        }
        validate_claims(&claims, now)?;
        Ok(claims)
    }

    fn mint(&self, user_id: UserId, token_type: TokenType, now: DateTime<Utc>) -> Result<String, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let expires_at = Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(TokenError::LifetimeOutOfRange)?;
        let claims = JwtClaims {
            sub: user_id,
            token_type,
            jti: Uuid::now_v7(),
            issued_at: now,
            expires_at,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Malformed(e.to_string()))
    }
}
