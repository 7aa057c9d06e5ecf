use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use catalog_core::{BrandId, CategoryId, ManufacturerId, ProductId, UserId, VariantId};
use catalog_products::{Brand, Category, Manufacturer, Product, Variant};

use super::{PgQuery, PgRecord};

impl PgRecord for Manufacturer {
    const TABLE: &'static str = "manufacturers";
    const COLUMNS: &'static [&'static str] = &["id", "name", "user_id", "date_added"];

    fn key(id: &Self::Id) -> Uuid {
        *id.as_uuid()
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: ManufacturerId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            user: UserId::from_uuid(row.try_get("user_id")?),
            date_added: row.try_get("date_added")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(*self.id.as_uuid())
            .bind(&self.name)
            .bind(*self.user.as_uuid())
            .bind(self.date_added)
    }
}

impl PgRecord for Brand {
    const TABLE: &'static str = "brands";
    const COLUMNS: &'static [&'static str] = &["id", "name", "manufacturer_id", "user_id", "date_added"];

    fn key(id: &Self::Id) -> Uuid {
        *id.as_uuid()
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: BrandId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            manufacturer: ManufacturerId::from_uuid(row.try_get("manufacturer_id")?),
            user: UserId::from_uuid(row.try_get("user_id")?),
            date_added: row.try_get("date_added")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(*self.id.as_uuid())
            .bind(&self.name)
            .bind(*self.manufacturer.as_uuid())
            .bind(*self.user.as_uuid())
            .bind(self.date_added)
    }
}

impl PgRecord for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &["id", "name", "parent_category_id", "user_id", "date_added"];

    fn key(id: &Self::Id) -> Uuid {
        *id.as_uuid()
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let parent: Option<Uuid> = row.try_get("parent_category_id")?;
        Ok(Self {
            id: CategoryId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            parent_category: parent.map(CategoryId::from_uuid),
            user: UserId::from_uuid(row.try_get("user_id")?),
            date_added: row.try_get("date_added")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(*self.id.as_uuid())
            .bind(&self.name)
            .bind(self.parent_category.map(Uuid::from))
            .bind(*self.user.as_uuid())
            .bind(self.date_added)
    }
}

impl PgRecord for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "manufacturer_id",
        "brand_id",
        "description",
        "user_id",
        "date_added",
    ];

    fn key(id: &Self::Id) -> Uuid {
        *id.as_uuid()
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: ProductId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            manufacturer: ManufacturerId::from_uuid(row.try_get("manufacturer_id")?),
            brand: BrandId::from_uuid(row.try_get("brand_id")?),
            description: row.try_get("description")?,
            user: UserId::from_uuid(row.try_get("user_id")?),
            date_added: row.try_get("date_added")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(*self.id.as_uuid())
            .bind(&self.name)
            .bind(*self.manufacturer.as_uuid())
            .bind(*self.brand.as_uuid())
            .bind(&self.description)
            .bind(*self.user.as_uuid())
            .bind(self.date_added)
    }
}

impl PgRecord for Variant {
    const TABLE: &'static str = "variants";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "product_id",
        "manufacturer_id",
        "brand_id",
        "price",
        "sku",
        "stock",
        "description",
        "user_id",
        "date_added",
    ];

    fn key(id: &Self::Id) -> Uuid {
        *id.as_uuid()
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: VariantId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            product: ProductId::from_uuid(row.try_get("product_id")?),
            manufacturer: ManufacturerId::from_uuid(row.try_get("manufacturer_id")?),
            brand: BrandId::from_uuid(row.try_get("brand_id")?),
            price: row.try_get("price")?,
            sku: row.try_get("sku")?,
            stock: row.try_get("stock")?,
            description: row.try_get("description")?,
            user: UserId::from_uuid(row.try_get("user_id")?),
            date_added: row.try_get("date_added")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(*self.id.as_uuid())
            .bind(&self.name)
            .bind(*self.product.as_uuid())
            .bind(*self.manufacturer.as_uuid())
            .bind(*self.brand.as_uuid())
            .bind(self.price)
            .bind(&self.sku)
            .bind(self.stock)
            .bind(&self.description)
            .bind(*self.user.as_uuid())
            .bind(self.date_added)
    }
}
