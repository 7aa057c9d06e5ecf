//! In-memory store for tests/dev.
//!
//! All tables live behind one `RwLock`, so every write (including batch
//! inserts and cascading deletes) is applied atomically.

mod records;
mod users;

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use catalog_auth::User;
use catalog_core::{
    BrandId, CategoryId, ManufacturerId, ProductId, StoreError, StoreResult, UserId, VariantId,
};
use catalog_products::{Brand, CatalogEntity, Category, Manufacturer, Product, Variant};

use crate::Repository;

/// Every table of the in-memory store. Keys are UUIDv7 ids, so iteration
/// order is creation order.
#[derive(Debug, Default)]
pub struct Tables {
    pub users: BTreeMap<UserId, User>,
    pub manufacturers: BTreeMap<ManufacturerId, Manufacturer>,
    pub brands: BTreeMap<BrandId, Brand>,
    pub categories: BTreeMap<CategoryId, Category>,
    pub products: BTreeMap<ProductId, Product>,
    pub variants: BTreeMap<VariantId, Variant>,
}

impl Tables {
    fn delete_manufacturer(&mut self, id: ManufacturerId) {
        let brands: Vec<BrandId> = self
            .brands
            .values()
            .filter(|b| b.manufacturer == id)
            .map(|b| b.id)
            .collect();
        for brand in brands {
            self.brands.remove(&brand);
            self.delete_brand(brand);
        }

        let products: Vec<ProductId> = self
            .products
            .values()
            .filter(|p| p.manufacturer == id)
            .map(|p| p.id)
            .collect();
        for product in products {
            self.products.remove(&product);
            self.delete_product(product);
        }

        self.variants.retain(|_, v| v.manufacturer != id);
    }

    fn delete_brand(&mut self, id: BrandId) {
        let products: Vec<ProductId> = self
            .products
            .values()
            .filter(|p| p.brand == id)
            .map(|p| p.id)
            .collect();
        for product in products {
            self.products.remove(&product);
            self.delete_product(product);
        }

        self.variants.retain(|_, v| v.brand != id);
    }

    fn delete_product(&mut self, id: ProductId) {
        self.variants.retain(|_, v| v.product != id);
    }

    fn delete_category(&mut self, id: CategoryId) {
        for child in self.categories.values_mut() {
            if child.parent_category == Some(id) {
                child.parent_category = None;
            }
        }
    }
}

/// Per-entity hooks the in-memory store needs: where the table lives, which
/// field is unique, which references must resolve, and what a delete
/// cascades to.
pub trait InMemoryRecord: CatalogEntity {
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self>;

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;

    /// `(wire field, value)` of the unique column, if the entity has one.
    fn unique_key(&self) -> Option<(&'static str, &str)> {
        None
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()>;

    /// Called after the record itself has been removed.
    fn cascade_delete(_id: Self::Id, _tables: &mut Tables) {}
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }
}

fn check_unique<E: InMemoryRecord>(record: &E, others: &[E], tables: &Tables) -> StoreResult<()> {
    let Some((field, value)) = record.unique_key() else {
        return Ok(());
    };
    let clashes = |other: &E| other.id() != record.id() && other.unique_key().map(|(_, v)| v) == Some(value);

    if E::table(tables).values().any(clashes) || others.iter().any(clashes) {
        return Err(StoreError::duplicate(E::NAME, field));
    }
    Ok(())
}

#[async_trait]
impl<E: InMemoryRecord> Repository<E> for InMemoryStore {
    async fn insert(&self, records: Vec<E>) -> StoreResult<Vec<E>> {
        let mut tables = self.write()?;

        for (i, record) in records.iter().enumerate() {
            record.check_references(&tables)?;
            check_unique(record, &records[..i], &tables)?;
        }

        let table = E::table_mut(&mut tables);
        for record in &records {
            table.insert(*record.id(), record.clone());
        }
        debug!(entity = E::NAME, count = records.len(), "records inserted");
        Ok(records)
    }

    async fn update(&self, record: E) -> StoreResult<E> {
        let mut tables = self.write()?;
        if !E::table(&tables).contains_key(record.id()) {
            return Err(StoreError::NotFound);
        }
        record.check_references(&tables)?;
        check_unique(&record, &[], &tables)?;

        E::table_mut(&mut tables).insert(*record.id(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: E::Id) -> StoreResult<Option<E>> {
        Ok(E::table(&*self.read()?).get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<E>> {
        Ok(E::table(&*self.read()?).values().cloned().collect())
    }

    async fn delete(&self, id: E::Id) -> StoreResult<bool> {
        let mut tables = self.write()?;
        if E::table_mut(&mut tables).remove(&id).is_none() {
            return Ok(false);
        }
        E::cascade_delete(id, &mut tables);
        debug!(entity = E::NAME, %id, "record deleted");
        Ok(true)
    }
}
