//! `catalog-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod fields;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, FieldErrors, StoreError, StoreResult};
pub use fields::WriteMode;
pub use id::{BrandId, CategoryId, ManufacturerId, ProductId, UserId, VariantId};
pub use value_object::ValueObject;
