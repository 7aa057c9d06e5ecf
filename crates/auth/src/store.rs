//! User persistence abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use catalog_core::{StoreResult, UserId};

use crate::{Mobile, User};

/// Storage backend for users.
///
/// Implementations enforce mobile uniqueness and report a clash as
/// [`catalog_core::StoreError::Duplicate`] on the `mobile` field.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: User) -> StoreResult<User>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_by_mobile(&self, mobile: &Mobile) -> StoreResult<Option<User>>;

    /// Persist profile changes (mobile, name, password hash, flags).
    async fn update_user(&self, user: User) -> StoreResult<User>;

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()>;
}
