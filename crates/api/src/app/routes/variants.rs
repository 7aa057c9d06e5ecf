//! Variant creation, which accepts one object or a list of them.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use catalog_core::{FieldErrors, StoreError, UserId};
use catalog_infra::Repository;
use catalog_products::{CatalogEntity, Variant, VariantInput};

use crate::app::dto::parse_body;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::crud::owner_of;
use crate::app::state::AppState;
use crate::authz::{CATALOG_POLICY, authorize_collection};
use crate::context::ActorContext;

/// `POST /variant/`. A list is validated as a whole and stored atomically;
/// the response mirrors the shape of the request.
pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(ctx): Extension<ActorContext>,
    method: Method,
    body: Bytes,
) -> ApiResult<Response> {
    authorize_collection(&CATALOG_POLICY, &ctx, &method)?;
    let owner = owner_of(&ctx)?;
    let now = Utc::now();

    match parse_body::<Value>(&body)? {
        Value::Array(items) => {
            let variants = build_batch(items, owner, now)?;
            let count = variants.len();
            let stored = Repository::<Variant>::insert(state.catalog.as_ref(), variants).await?;
            info!(count, %owner, "variant batch created");
            Ok((StatusCode::CREATED, Json(stored)).into_response())
        }
        single => {
            let input: VariantInput = serde_json::from_value(single).map_err(ApiError::invalid_body)?;
            let variant = Variant::create(input, owner, now)?;
            let stored = Repository::<Variant>::insert(state.catalog.as_ref(), vec![variant])
                .await?
                .pop()
                .ok_or_else(|| ApiError::internal("insert returned no record"))?;
            info!(id = %stored.id, %owner, "variant created");
            Ok((StatusCode::CREATED, Json(stored)).into_response())
        }
    }
}

/// Validate every item before anything is written. Field errors are keyed
/// `"<index>.<field>"`; a SKU repeated inside the batch is a conflict.
fn build_batch(items: Vec<Value>, owner: UserId, now: DateTime<Utc>) -> ApiResult<Vec<Variant>> {
    let mut errors = FieldErrors::new();
    let mut duplicates = FieldErrors::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut variants = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let input: VariantInput = match serde_json::from_value(item) {
            Ok(input) => input,
            Err(e) => {
                errors.add(index.to_string(), format!("Invalid data: {e}"));
                continue;
            }
        };

        if let Some(sku) = input.sku() {
            if seen.insert(sku.to_owned(), index).is_some() {
                duplicates.add(
                    format!("{index}.SKU"),
                    StoreError::duplicate(Variant::NAME, "SKU").to_string(),
                );
            }
        }

        match Variant::create(input, owner, now) {
            Ok(variant) => variants.push(variant),
            Err(item_errors) => errors.merge_prefixed(&index.to_string(), item_errors),
        }
    }

    if !errors.is_empty() {
        return Err(errors.into());
    }
    if !duplicates.is_empty() {
        return Err(ApiError::Conflict {
            message: format!("duplicate SKU in request: {duplicates}"),
            fields: duplicates,
        });
    }
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(sku: &str) -> Value {
        json!({
            "name": "Blue",
            "product": UserId::new().to_string(),
            "manufacturer": UserId::new().to_string(),
            "brand": UserId::new().to_string(),
            "price": 9.5,
            "SKU": sku,
            "stock": 3,
        })
    }

    #[test]
    fn valid_batch_builds_every_variant() {
        let variants = build_batch(vec![item("A-1"), item("A-2")], UserId::new(), Utc::now()).unwrap();
        assert_eq!(variants.len(), 2);
    }

    #[test]
    fn field_errors_are_prefixed_with_the_item_index() {
        let mut broken = item("A-2");
        broken["stock"] = Value::Null;

        let err = build_batch(vec![item("A-1"), broken], UserId::new(), Utc::now()).unwrap_err();
        let fields = err.fields().unwrap();
        assert!(fields.get("1.stock").is_some());
        assert!(fields.get("0.stock").is_none());
    }

    #[test]
    fn repeated_sku_in_one_batch_is_a_conflict() {
        let err = build_batch(vec![item("A-1"), item("A-1")], UserId::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::Conflict { .. }));
        assert!(err.fields().unwrap().get("1.SKU").is_some());
    }

    #[test]
    fn empty_batch_is_allowed() {
        assert!(build_batch(Vec::new(), UserId::new(), Utc::now()).unwrap().is_empty());
    }
}
