//! Catalog domain: manufacturers, brands, categories, products and variants.
//!
//! This crate contains the entities and their input validation as pure,
//! deterministic logic (no IO, no HTTP, no storage). Reference fields are
//! plain ids; whether they resolve is the store's concern.

pub mod brand;
pub mod category;
pub mod entity;
pub mod manufacturer;
pub mod product;
pub mod variant;

pub use brand::{Brand, BrandInput};
pub use category::{Category, CategoryInput};
pub use entity::CatalogEntity;
pub use manufacturer::{Manufacturer, ManufacturerInput};
pub use product::{Product, ProductInput};
pub use variant::{Variant, VariantInput};
