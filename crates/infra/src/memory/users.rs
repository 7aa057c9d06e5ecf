use async_trait::async_trait;
use chrono::{DateTime, Utc};

use catalog_auth::{Mobile, User, UserStore};
use catalog_core::{StoreError, StoreResult, UserId};

use super::{InMemoryStore, Tables};

fn check_mobile(tables: &Tables, user: &User) -> StoreResult<()> {
    let taken = tables
        .users
        .values()
        .any(|u| u.id != user.id && u.mobile == user.mobile);
    if taken {
        return Err(StoreError::duplicate("user", "mobile"));
    }
    Ok(())
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.write()?;
        check_mobile(&tables, &user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_mobile(&self, mobile: &Mobile) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.values().find(|u| &u.mobile == mobile).cloned())
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.write()?;
        check_mobile(&tables, &user)?;
        match tables.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()> {
        let mut tables = self.write()?;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.last_login = Some(at);
        Ok(())
    }
}
