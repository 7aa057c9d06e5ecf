use catalog_auth::{Actor, User};

/// The caller of a request, resolved once by the auth middleware.
///
/// Always present on requests that went through the middleware; anonymous
/// callers carry [`Actor::Anonymous`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn anonymous() -> Self {
        Self { actor: Actor::Anonymous }
    }

    pub fn user(user: User) -> Self {
        Self { actor: Actor::User(user) }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }
}
