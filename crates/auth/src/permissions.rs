//! Access policies.
//!
//! Two independent policies decide whether an [`Actor`] may perform an
//! [`Action`], either on a collection (list/create) or on a stored instance
//! (retrieve/update/delete):
//!
//! | actor                     | Superuser policy          | Executive policy                  |
//! |---------------------------|---------------------------|-----------------------------------|
//! | superuser                 | everything                | everything                        |
//! | executive                 | collection: safe only; instance: nothing | everything         |
//! | other authenticated user  | collection: safe only; instance: nothing | collection: safe; instance: `GET` |
//! | anonymous                 | nothing                   | nothing                           |

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Actor, AuthzError};

/// A request method, independent of any HTTP library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Get,
        Action::Head,
        Action::Options,
        Action::Post,
        Action::Put,
        Action::Patch,
        Action::Delete,
    ];

    /// Read-only actions (`GET`, `HEAD`, `OPTIONS`).
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported method '{s}'"))
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permission policy.
///
/// Implementations must be pure: the decision depends only on the actor's
/// flags, its authentication state and the action.
pub trait AccessPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Checked for every request before any lookup.
    fn authorize_collection_action(&self, actor: &Actor, action: Action) -> Result<(), AuthzError>;

    /// Checked after the addressed instance has been loaded.
    fn authorize_instance_action(&self, actor: &Actor, action: Action) -> Result<(), AuthzError>;
}

fn allow_if(allowed: bool, actor: &Actor) -> Result<(), AuthzError> {
    if allowed {
        Ok(())
    } else {
        Err(AuthzError::for_actor(actor))
    }
}

/// Superusers do everything; other authenticated users may only read
/// collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperuserPolicy;

impl AccessPolicy for SuperuserPolicy {
    fn name(&self) -> &'static str {
        "superuser"
    }

    fn authorize_collection_action(&self, actor: &Actor, action: Action) -> Result<(), AuthzError> {
        let roles = actor.roles();
        let allowed = roles.is_superuser || (actor.is_authenticated() && action.is_safe());
        allow_if(allowed, actor)
    }

    fn authorize_instance_action(&self, actor: &Actor, _action: Action) -> Result<(), AuthzError> {
        allow_if(actor.roles().is_superuser, actor)
    }
}

/// Executives (and superusers) do everything; other authenticated users may
/// read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutivePolicy;

impl ExecutivePolicy {
    fn is_executive(actor: &Actor) -> bool {
        let roles = actor.roles();
        roles.is_executive || roles.is_superuser
    }
}

impl AccessPolicy for ExecutivePolicy {
    fn name(&self) -> &'static str {
        "executive"
    }

    fn authorize_collection_action(&self, actor: &Actor, action: Action) -> Result<(), AuthzError> {
        let allowed = Self::is_executive(actor) || (actor.is_authenticated() && action.is_safe());
        allow_if(allowed, actor)
    }

    fn authorize_instance_action(&self, actor: &Actor, action: Action) -> Result<(), AuthzError> {
        let allowed = Self::is_executive(actor) || (actor.is_authenticated() && action == Action::Get);
        allow_if(allowed, actor)
    }
}
