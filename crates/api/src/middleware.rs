use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::app::errors::ApiError;
use crate::app::state::AppState;
use crate::context::ActorContext;

/// Resolve an optional bearer token into an [`ActorContext`].
///
/// A missing header (or a non-bearer scheme) leaves the caller anonymous;
/// whether that is acceptable is up to the permission policy of the route.
/// A bearer token that does not resolve to an active user is rejected here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let context = match extract_bearer(req.headers())? {
        None => ActorContext::anonymous(),
        Some(token) => {
            let user = state.auth.resolve(token).await.map_err(|e| {
                tracing::debug!(error = %e, "bearer token rejected");
                ApiError::from(e)
            })?;
            ActorContext::user(user)
        }
    };

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| ApiError::TokenNotValid)?;

    let Some(token) = header.strip_prefix("Bearer ") else {
        return Ok(None);
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::TokenNotValid);
    }

    Ok(Some(token))
}
