use serde::Serialize;
use thiserror::Error;

use crate::{AccessPolicy, Action, Actor};

/// Why a policy refused an action.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    /// The caller presented no credentials.
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    /// The caller is known but lacks the required role flag.
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,
}

impl AuthzError {
    /// The denial matching an actor's authentication state.
    pub fn for_actor(actor: &Actor) -> Self {
        if actor.is_authenticated() {
            Self::PermissionDenied
        } else {
            Self::NotAuthenticated
        }
    }
}

/// Whether an action targets a whole collection or a single stored instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Collection,
    Instance,
}

/// Authorize an action against a policy.
///
/// - No IO
/// - No panics
/// - Pure function of (actor flags, action, scope)
pub fn authorize(
    policy: &dyn AccessPolicy,
    actor: &Actor,
    action: Action,
    scope: Scope,
) -> Result<(), AuthzError> {
    let result = match scope {
        Scope::Collection => policy.authorize_collection_action(actor, action),
        Scope::Instance => policy.authorize_instance_action(actor, action),
    };

    if let Err(ref denial) = result {
        tracing::debug!(
            policy = policy.name(),
            %actor,
            action = action.as_str(),
            ?scope,
            %denial,
            "authorization denied"
        );
    }

    result
}
