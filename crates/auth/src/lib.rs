//! `catalog-auth` — authentication and authorization boundary.
//!
//! This crate is decoupled from HTTP and from any concrete storage backend:
//! users are persisted through the [`UserStore`] trait and request methods
//! arrive as [`Action`]s.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod service;
pub mod store;
pub mod tokens;
pub mod user;

#[cfg(test)]
mod test_utils;

pub use authorize::{AuthzError, Scope, authorize};
pub use claims::{JwtClaims, TokenError, TokenType, validate_claims};
pub use error::{AuthError, Result};
pub use permissions::{AccessPolicy, Action, ExecutivePolicy, SuperuserPolicy};
pub use principal::Actor;
pub use roles::RoleFlags;
pub use service::{AuthService, LoginOutcome};
pub use store::UserStore;
pub use tokens::{TokenIssuer, TokenPair, TokenSettings};
pub use user::{Mobile, User, UserInput, UserName};
