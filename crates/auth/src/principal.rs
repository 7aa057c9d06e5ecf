use catalog_core::UserId;

use crate::{RoleFlags, User};

/// The caller of a request, as seen by the permission policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// No credentials were presented.
    Anonymous,
    /// A bearer token resolved to an active user.
    User(User),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Role flags used for policy decisions; anonymous callers hold none.
    pub fn roles(&self) -> RoleFlags {
        match self {
            Self::Anonymous => RoleFlags::none(),
            Self::User(user) => user.roles,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user().map(|u| u.id)
    }
}

impl From<User> for Actor {
    fn from(value: User) -> Self {
        Self::User(value)
    }
}

impl core::fmt::Display for Actor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::User(user) => write!(f, "user:{}", user.id),
        }
    }
}
