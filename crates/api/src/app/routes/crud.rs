//! Generic CRUD handlers shared by every catalog resource.
//!
//! Each request runs the collection check first, then (for instance routes)
//! loads the record and runs the instance check. An id that does not parse
//! is treated like an id that does not exist.

use axum::body::Bytes;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get};
use axum::{Extension, Json, Router, extract::Path};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use catalog_core::{Entity, UserId, WriteMode};
use catalog_infra::{CatalogStore, Repository};
use catalog_products::CatalogEntity;

use crate::app::dto::parse_body;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::system::method_not_allowed;
use crate::app::state::AppState;
use crate::authz::{CATALOG_POLICY, authorize_collection, authorize_instance};
use crate::context::ActorContext;

const COLLECTION_METHODS: &str = "GET, POST, HEAD, OPTIONS";
const INSTANCE_METHODS: &str = "GET, PUT, PATCH, DELETE, HEAD, OPTIONS";

/// `{base}/` and `{base}/:id/` for one entity.
pub fn routes<E>(base: &str) -> Router
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    Router::new()
        .route(
            &format!("{base}/"),
            collection::<E>().post(create::<E>).fallback(method_not_allowed),
        )
        .route(&format!("{base}/:id/"), instance::<E>())
}

/// Read side of a collection route; the caller adds `POST`.
pub fn collection<E>() -> MethodRouter
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    get(list::<E>).options(collection_options::<E>)
}

pub fn instance<E>() -> MethodRouter
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    get(retrieve::<E>)
        .put(update::<E>)
        .patch(update::<E>)
        .delete(destroy::<E>)
        .options(instance_options::<E>)
        .fallback(method_not_allowed)
}

/// Acting user, for ownership. Policies already rejected anonymous writes.
pub fn owner_of(ctx: &ActorContext) -> ApiResult<UserId> {
    ctx.actor().user_id().ok_or(ApiError::NotAuthenticated)
}

async fn list<E>(
    Extension(state): Extension<AppState>,
    Extension(ctx): Extension<ActorContext>,
    method: Method,
) -> ApiResult<Json<Vec<E>>>
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    authorize_collection(&CATALOG_POLICY, &ctx, &method)?;
    let records = <dyn CatalogStore as Repository<E>>::list(state.catalog.as_ref()).await?;
    Ok(Json(records))
}

async fn collection_options<E>(Extension(ctx): Extension<ActorContext>, method: Method) -> ApiResult<Response>
where
    E: CatalogEntity,
{
    authorize_collection(&CATALOG_POLICY, &ctx, &method)?;
    Ok(describe(E::NAME, COLLECTION_METHODS))
}

/// Metadata only: no lookup, so an unknown id is still described.
async fn instance_options<E>(Extension(ctx): Extension<ActorContext>, method: Method) -> ApiResult<Response>
where
    E: CatalogEntity,
{
    authorize_collection(&CATALOG_POLICY, &ctx, &method)?;
    Ok(describe(E::NAME, INSTANCE_METHODS))
}

/// `OPTIONS` body: the resource name and its methods, mirrored in `Allow`.
pub fn describe(name: &str, methods: &'static str) -> Response {
    let body = Json(json!({
        "name": name,
        "methods": methods.split(", ").collect::<Vec<_>>(),
    }));
    let mut response = body.into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(methods));
    response
}

async fn create<E>(
    Extension(state): Extension<AppState>,
    Extension(ctx): Extension<ActorContext>,
    method: Method,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<E>)>
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    authorize_collection(&CATALOG_POLICY, &ctx, &method)?;
    let owner = owner_of(&ctx)?;
    let input: E::Input = parse_body(&body)?;

    let record = E::create(input, owner, Utc::now())?;
    let record = <dyn CatalogStore as Repository<E>>::insert(state.catalog.as_ref(), vec![record])
        .await?
        .pop()
        .ok_or_else(|| ApiError::internal("insert returned no record"))?;

    info!(entity = E::NAME, id = %record.id(), %owner, "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Collection check, lookup, instance check.
async fn load<E>(state: &AppState, ctx: &ActorContext, method: &Method, raw_id: &str) -> ApiResult<E>
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    authorize_collection(&CATALOG_POLICY, ctx, method)?;
    let id: E::Id = raw_id.parse().map_err(ApiError::from)?;
    let record = <dyn CatalogStore as Repository<E>>::get(state.catalog.as_ref(), id)
        .await?
        .ok_or(ApiError::NotFound)?;
    authorize_instance(&CATALOG_POLICY, ctx, method)?;
    Ok(record)
}

async fn retrieve<E>(
    Extension(state): Extension<AppState>,
    Extension(ctx): Extension<ActorContext>,
    method: Method,
    Path(id): Path<String>,
) -> ApiResult<Json<E>>
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    let record = load::<E>(&state, &ctx, &method, &id).await?;
    Ok(Json(record))
}

/// `PUT` replaces (every required field), `PATCH` applies what is supplied.
async fn update<E>(
    Extension(state): Extension<AppState>,
    Extension(ctx): Extension<ActorContext>,
    method: Method,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<E>>
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    let mut record = load::<E>(&state, &ctx, &method, &id).await?;
    let input: E::Input = parse_body(&body)?;
    let mode = if method == Method::PATCH {
        WriteMode::Partial
    } else {
        WriteMode::Full
    };

    record.apply(input, mode)?;
    let record = <dyn CatalogStore as Repository<E>>::update(state.catalog.as_ref(), record).await?;

    info!(entity = E::NAME, id = %record.id(), ?mode, "record updated");
    Ok(Json(record))
}

async fn destroy<E>(
    Extension(state): Extension<AppState>,
    Extension(ctx): Extension<ActorContext>,
    method: Method,
    Path(id): Path<String>,
) -> ApiResult<StatusCode>
where
    E: CatalogEntity,
    dyn CatalogStore: Repository<E>,
{
    let record = load::<E>(&state, &ctx, &method, &id).await?;
    let id = *record.id();
    if !<dyn CatalogStore as Repository<E>>::delete(state.catalog.as_ref(), id).await? {
        return Err(ApiError::NotFound);
    }

    info!(entity = E::NAME, %id, "record deleted");
    Ok(StatusCode::NO_CONTENT)
}
