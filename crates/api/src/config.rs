//! Server configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured when present.
//!
//! # Environment Variables
//!
//! - `CATALOG_BIND_ADDR` - Listen address (default: 0.0.0.0:8080)
//! - `JWT_SECRET` - Token signing secret (default: insecure dev secret)
//! - `DATABASE_URL` - `PostgreSQL` connection string; in-memory store when unset
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `ACCESS_TOKEN_TTL_SECS` - Access token lifetime (default: 300)
//! - `REFRESH_TOKEN_TTL_SECS` - Refresh token lifetime (default: 86400)
//! - `SUPERUSER_MOBILE` / `SUPERUSER_PASSWORD` - Bootstrap superuser, both or neither
//! - `SUPERUSER_NAME` - Bootstrap superuser name (default: superuser)
//! - `LOG_FORMAT` - `json` (default) or `pretty`

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use catalog_auth::TokenSettings;
use catalog_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACCESS_TTL_SECS: u64 = 5 * 60;
const DEFAULT_REFRESH_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_SUPERUSER_NAME: &str = "superuser";
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Credentials for the superuser created at startup.
#[derive(Clone)]
pub struct SuperuserConfig {
    pub mobile: String,
    pub password: String,
    pub name: String,
}

impl std::fmt::Debug for SuperuserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperuserConfig")
            .field("mobile", &self.mobile)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub superuser: Option<SuperuserConfig>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"[REDACTED]")
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("max_connections", &self.max_connections)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("superuser", &self.superuser)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let superuser = match (get("SUPERUSER_MOBILE"), get("SUPERUSER_PASSWORD")) {
            (Some(mobile), Some(password)) => Some(SuperuserConfig {
                mobile,
                password,
                name: get("SUPERUSER_NAME").unwrap_or_else(|| DEFAULT_SUPERUSER_NAME.to_string()),
            }),
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("SUPERUSER_PASSWORD".into())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("SUPERUSER_MOBILE".into())),
            (None, None) => None,
        };

        let max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "DB_MAX_CONNECTIONS".into(),
                "must be at least 1".into(),
            ));
        }

        Ok(Self {
            bind_addr: parse_or(
                "CATALOG_BIND_ADDR",
                get("CATALOG_BIND_ADDR"),
                SocketAddr::from(([0, 0, 0, 0], 8080)),
            )?,
            jwt_secret,
            database_url: get("DATABASE_URL"),
            max_connections,
            access_ttl: ttl("ACCESS_TOKEN_TTL_SECS", get("ACCESS_TOKEN_TTL_SECS"), DEFAULT_ACCESS_TTL_SECS)?,
            refresh_ttl: ttl("REFRESH_TOKEN_TTL_SECS", get("REFRESH_TOKEN_TTL_SECS"), DEFAULT_REFRESH_TTL_SECS)?,
            superuser,
            log_format: parse_or("LOG_FORMAT", get("LOG_FORMAT"), LogFormat::default())?,
        })
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings::new(self.jwt_secret.as_bytes().to_vec())
            .with_access_ttl(self.access_ttl)
            .with_refresh_ttl(self.refresh_ttl)
    }

    /// Whether tokens are signed with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn default_bind_addr() -> &'static str {
        DEFAULT_BIND_ADDR
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

fn ttl(key: &str, raw: Option<String>, default_secs: u64) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_or(key, raw, default_secs)?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(key.to_string(), "must be positive".into()));
    }
    if secs > MAX_TTL_SECS {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be at most {MAX_TTL_SECS} seconds (365 days)"),
        ));
    }
    Ok(Duration::from_secs(secs))
}
