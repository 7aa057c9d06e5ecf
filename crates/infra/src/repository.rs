use async_trait::async_trait;

use catalog_core::StoreResult;
use catalog_products::{Brand, CatalogEntity, Category, Manufacturer, Product, Variant};

/// Persistence for one catalog entity type.
///
/// Implementations enforce the relational invariants: unique fields are
/// reported as [`catalog_core::StoreError::Duplicate`], dangling references as
/// [`catalog_core::StoreError::MissingReference`], and deletes cascade to
/// dependent records.
#[async_trait]
pub trait Repository<E: CatalogEntity>: Send + Sync {
    /// Insert every record or none of them.
    async fn insert(&self, records: Vec<E>) -> StoreResult<Vec<E>>;

    /// Replace a stored record. Fails with `NotFound` if it does not exist.
    async fn update(&self, record: E) -> StoreResult<E>;

    async fn get(&self, id: E::Id) -> StoreResult<Option<E>>;

    /// All records, oldest first.
    async fn list(&self) -> StoreResult<Vec<E>>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: E::Id) -> StoreResult<bool>;
}

/// A store that persists every catalog entity.
pub trait CatalogStore:
    Repository<Manufacturer> + Repository<Brand> + Repository<Category> + Repository<Product> + Repository<Variant>
{
}

impl<T> CatalogStore for T where
    T: Repository<Manufacturer>
        + Repository<Brand>
        + Repository<Category>
        + Repository<Product>
        + Repository<Variant>
{
}
