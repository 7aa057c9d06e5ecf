use std::collections::BTreeMap;

use catalog_core::{StoreError, StoreResult};
use catalog_products::{Brand, Category, Manufacturer, Product, Variant};

use super::{InMemoryRecord, Tables};

fn require(exists: bool, field: &str) -> StoreResult<()> {
    if exists {
        Ok(())
    } else {
        Err(StoreError::missing_reference(field))
    }
}

impl InMemoryRecord for Manufacturer {
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self> {
        &tables.manufacturers
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self> {
        &mut tables.manufacturers
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("name", &self.name))
    }

    fn check_references(&self, _tables: &Tables) -> StoreResult<()> {
        Ok(())
    }

    fn cascade_delete(id: Self::Id, tables: &mut Tables) {
        tables.delete_manufacturer(id);
    }
}

impl InMemoryRecord for Brand {
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self> {
        &tables.brands
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self> {
        &mut tables.brands
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("name", &self.name))
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require(tables.manufacturers.contains_key(&self.manufacturer), "manufacturer")
    }

    fn cascade_delete(id: Self::Id, tables: &mut Tables) {
        tables.delete_brand(id);
    }
}

impl InMemoryRecord for Category {
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self> {
        &mut tables.categories
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("name", &self.name))
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        match self.parent_category {
            Some(parent) => require(tables.categories.contains_key(&parent), "parent_category"),
            None => Ok(()),
        }
    }

    fn cascade_delete(id: Self::Id, tables: &mut Tables) {
        tables.delete_category(id);
    }
}

impl InMemoryRecord for Product {
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self> {
        &tables.products
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self> {
        &mut tables.products
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require(tables.manufacturers.contains_key(&self.manufacturer), "manufacturer")?;
        require(tables.brands.contains_key(&self.brand), "brand")
    }

    fn cascade_delete(id: Self::Id, tables: &mut Tables) {
        tables.delete_product(id);
    }
}

impl InMemoryRecord for Variant {
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self> {
        &tables.variants
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self> {
        &mut tables.variants
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("SKU", &self.sku))
    }

    fn check_references(&self, tables: &Tables) -> StoreResult<()> {
        require(tables.products.contains_key(&self.product), "product")?;
        require(tables.manufacturers.contains_key(&self.manufacturer), "manufacturer")?;
        require(tables.brands.contains_key(&self.brand), "brand")
    }
}
