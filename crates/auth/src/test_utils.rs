use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use catalog_core::{StoreError, StoreResult, UserId};

use crate::{Mobile, RoleFlags, User, UserName, UserStore};

pub fn user_with(roles: RoleFlags) -> User {
    User::new(
        Mobile::parse("9000000001").unwrap(),
        UserName::parse("testuser").unwrap(),
        "not-a-real-hash".into(),
        roles,
        Utc::now(),
    )
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<UserId, User>>,
}

impl MemoryUsers {
    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn set_active(&self, id: UserId, active: bool) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.roles.is_active = active;
        }
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.mobile == user.mobile) {
            return Err(StoreError::duplicate("user", "mobile"));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_mobile(&self, mobile: &Mobile) -> StoreResult<Option<User>> {
        Ok(self.users.lock().unwrap().values().find(|u| &u.mobile == mobile).cloned())
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.id != user.id && u.mobile == user.mobile) {
            return Err(StoreError::duplicate("user", "mobile"));
        }
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(user)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()> {
        match self.users.lock().unwrap().get_mut(&id) {
            Some(user) => {
                user.last_login = Some(at);
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}
