//! Authentication service.
//!
//! Orchestrates credential checks, token issuance and user lifecycle on top
//! of a [`UserStore`]. This is the only entry point the HTTP layer uses for
//! anything that touches credentials.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use catalog_core::{StoreError, WriteMode};

use crate::claims::TokenType;
use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password, verify_without_user};
use crate::store::UserStore;
use crate::tokens::{TokenIssuer, TokenPair};
use crate::user::{Mobile, NewUser, User, UserInput};
use crate::RoleFlags;

/// Successful login: the user (with `last_login` updated) and its tokens.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenIssuer,
}

impl core::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthService").field("tokens", &self.tokens).finish()
    }
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Register a plain user from client input.
    pub async fn register(&self, input: UserInput) -> Result<User> {
        let new = input.validate_new()?;
        let user = self.insert(new, RoleFlags::member()).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Create a user with explicit role flags (administration/bootstrap).
    pub async fn create_user_with_roles(&self, input: UserInput, roles: RoleFlags) -> Result<User> {
        let new = input.validate_new()?;
        let user = self.insert(new, roles).await?;
        info!(user_id = %user.id, executive = roles.is_executive, superuser = roles.is_superuser, "user created");
        Ok(user)
    }

    /// Create a superuser (every role flag set).
    pub async fn create_superuser(&self, mobile: &str, password: &str, name: &str) -> Result<User> {
        let input = UserInput {
            mobile: Some(mobile.to_owned()),
            password: Some(password.to_owned()),
            name: Some(name.to_owned()),
        };
        self.create_user_with_roles(input, RoleFlags::superuser()).await
    }

    /// Verify credentials and issue a token pair.
    ///
    /// Unknown mobile, malformed mobile, inactive account and wrong password
    /// all fail with the same [`AuthError::InvalidCredentials`].
    pub async fn login(&self, mobile: &str, password: &str) -> Result<LoginOutcome> {
        let Ok(mobile) = Mobile::parse(mobile) else {
            verify_without_user(password);
            debug!("login rejected: malformed mobile");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(mut user) = self.store.find_by_mobile(&mobile).await? else {
            verify_without_user(password);
            debug!("login rejected: unknown mobile");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active() {
            debug!(user_id = %user.id, "login rejected: inactive user");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let tokens = self.tokens.issue_pair(user.id, now)?;
        self.store.record_login(user.id, now).await?;
        user.last_login = Some(now);

        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome { user, tokens })
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let now = Utc::now();
        let claims = self.tokens.verify(refresh_token, TokenType::Refresh, now)?;
        let user = self.active_user(claims.sub).await?;
        Ok(self.tokens.issue_access(user.id, now)?)
    }

    /// Resolve a bearer access token to its (active) user.
    pub async fn resolve(&self, access_token: &str) -> Result<User> {
        let claims = self.tokens.verify(access_token, TokenType::Access, Utc::now())?;
        self.active_user(claims.sub).await
    }

    /// Apply profile changes for `user`.
    pub async fn update_profile(&self, user: &User, input: UserInput, mode: WriteMode) -> Result<User> {
        let changes = input.validate(mode)?;
        let password_hash = match changes.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let mut updated = user.clone();
        updated.apply(changes, password_hash);
        let updated = self.store.update_user(updated).await?;
        info!(user_id = %updated.id, "user profile updated");
        Ok(updated)
    }

    async fn insert(&self, new: NewUser, roles: RoleFlags) -> Result<User> {
        let NewUser {
            mobile,
            name,
            password,
        } = new;
        let hash = hash_password(&password)?;
        let user = User::new(mobile, name, hash, roles, Utc::now());

        self.store.create_user(user).await.map_err(|e| {
            if matches!(e, StoreError::Duplicate { .. }) {
                debug!("registration rejected: mobile already taken");
            } else {
                warn!(error = %e, "user store failed during registration");
            }
            AuthError::Store(e)
        })
    }

    async fn active_user(&self, id: catalog_core::UserId) -> Result<User> {
        match self.store.find_by_id(id).await? {
            Some(user) if user.is_active() => Ok(user),
            _ => Err(AuthError::UserUnavailable),
        }
    }
}
