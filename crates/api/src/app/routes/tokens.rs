use axum::{Extension, Json};

use catalog_core::FieldErrors;
use catalog_core::fields::REQUIRED;

use crate::app::dto::{AccessResponse, RefreshRequest, TokenRequest, TokenResponse};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::ApiJson;
use crate::app::state::AppState;

/// `POST /token/`: exchange mobile + password for a token pair.
pub async fn obtain(
    Extension(state): Extension<AppState>,
    ApiJson(body): ApiJson<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let (mobile, password) = body.into_credentials()?;
    let outcome = state.auth.login(&mobile, &password).await?;
    Ok(Json(outcome.into()))
}

/// `POST /token/refresh/`: mint a new access token.
pub async fn refresh(
    Extension(state): Extension<AppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> ApiResult<Json<AccessResponse>> {
    let Some(token) = body.refresh else {
        return Err(FieldErrors::single("refresh", REQUIRED).into());
    };
    let access = state.auth.refresh(&token).await.map_err(|e| {
        tracing::debug!(error = %e, "refresh rejected");
        ApiError::from(e)
    })?;
    Ok(Json(AccessResponse { access }))
}
