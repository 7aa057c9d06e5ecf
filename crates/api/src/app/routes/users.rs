use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use axum::{Extension, Json};

use catalog_auth::UserInput;
use catalog_core::WriteMode;

use crate::app::dto::{MessageResponse, ProfileResponse, parse_body};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::ApiJson;
use crate::app::routes::crud::describe;
use crate::app::state::AppState;
use crate::authz::{USER_ADMIN_POLICY, authorize_collection};
use crate::context::ActorContext;

/// `POST /user/create/`: open registration.
pub async fn create(
    Extension(state): Extension<AppState>,
    ApiJson(input): ApiJson<UserInput>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    state.auth.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully",
        }),
    ))
}

/// `GET /user/me/`: the caller's public profile.
pub async fn me(Extension(ctx): Extension<ActorContext>) -> ApiResult<Json<ProfileResponse>> {
    let user = ctx.actor().user().ok_or(ApiError::NotAuthenticated)?;
    Ok(Json(ProfileResponse::from(user)))
}

/// `OPTIONS /user/me/`
pub async fn describe_me(Extension(ctx): Extension<ActorContext>, method: Method) -> ApiResult<Response> {
    authorize_collection(&USER_ADMIN_POLICY, &ctx, &method)?;
    Ok(describe("user", "GET, PUT, PATCH, HEAD, OPTIONS"))
}

/// `PUT|PATCH /user/me/`: update the caller's profile.
pub async fn update_me(
    Extension(state): Extension<AppState>,
    Extension(ctx): Extension<ActorContext>,
    method: Method,
    body: Bytes,
) -> ApiResult<Json<ProfileResponse>> {
    authorize_collection(&USER_ADMIN_POLICY, &ctx, &method)?;
    let user = ctx.actor().user().ok_or(ApiError::NotAuthenticated)?;

    let input: UserInput = parse_body(&body)?;
    let mode = if method == Method::PATCH {
        WriteMode::Partial
    } else {
        WriteMode::Full
    };
    let updated = state.auth.update_profile(user, input, mode).await?;
    Ok(Json(ProfileResponse::from(&updated)))
}
