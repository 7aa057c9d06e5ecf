//! API-side authorization guard.
//!
//! Maps the HTTP method onto a policy [`Action`] and runs the collection or
//! instance check before (or after) the store lookup.

use axum::http::Method;

use catalog_auth::{AccessPolicy, Action, ExecutivePolicy, Scope, SuperuserPolicy, authorize};

use crate::app::errors::ApiError;
use crate::context::ActorContext;

/// Guards every catalog resource.
pub const CATALOG_POLICY: ExecutivePolicy = ExecutivePolicy;

/// Guards user administration (`/user/me/` writes).
pub const USER_ADMIN_POLICY: SuperuserPolicy = SuperuserPolicy;

pub fn action_for(method: &Method) -> Result<Action, ApiError> {
    method.as_str().parse().map_err(|_| ApiError::MethodNotAllowed)
}

/// Checked for every request, before any lookup.
pub fn authorize_collection(policy: &dyn AccessPolicy, ctx: &ActorContext, method: &Method) -> Result<(), ApiError> {
    let action = action_for(method)?;
    authorize(policy, ctx.actor(), action, Scope::Collection).map_err(ApiError::from)
}

/// Checked once the addressed instance has been loaded.
pub fn authorize_instance(policy: &dyn AccessPolicy, ctx: &ActorContext, method: &Method) -> Result<(), ApiError> {
    let action = action_for(method)?;
    authorize(policy, ctx.actor(), action, Scope::Instance).map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use catalog_auth::{Mobile, RoleFlags, User, UserName};

    use super::*;

    fn user(roles: RoleFlags) -> ActorContext {
        ActorContext::user(User::new(
            Mobile::parse("9876543210").unwrap(),
            UserName::parse("validname").unwrap(),
            "hash".into(),
            roles,
            Utc::now(),
        ))
    }

    #[test]
    fn methods_map_to_actions() {
        assert_eq!(action_for(&Method::PATCH).unwrap(), Action::Patch);
        assert!(matches!(action_for(&Method::TRACE), Err(ApiError::MethodNotAllowed)));
    }

    #[test]
    fn anonymous_writes_are_unauthenticated() {
        assert!(matches!(
            authorize_collection(&CATALOG_POLICY, &ActorContext::anonymous(), &Method::POST),
            Err(ApiError::NotAuthenticated)
        ));
    }

    #[test]
    fn members_read_but_do_not_write() {
        let member = user(RoleFlags::member());
        assert!(authorize_collection(&CATALOG_POLICY, &member, &Method::GET).is_ok());
        assert!(authorize_instance(&CATALOG_POLICY, &member, &Method::GET).is_ok());
        assert!(matches!(
            authorize_instance(&CATALOG_POLICY, &member, &Method::DELETE),
            Err(ApiError::PermissionDenied)
        ));
        assert!(matches!(
            authorize_collection(&USER_ADMIN_POLICY, &member, &Method::PATCH),
            Err(ApiError::PermissionDenied)
        ));
    }

    #[test]
    fn executives_write_the_catalog() {
        let executive = user(RoleFlags::executive());
        assert!(authorize_collection(&CATALOG_POLICY, &executive, &Method::POST).is_ok());
        assert!(authorize_instance(&CATALOG_POLICY, &executive, &Method::PUT).is_ok());
    }
}
