use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::fields::{self, MAX_NAME_LEN, nullable};
use catalog_core::{BrandId, Entity, FieldErrors, ManufacturerId, ProductId, UserId, WriteMode};

use crate::CatalogEntity;

/// A product line. Its sellable units are [`crate::Variant`]s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub manufacturer: ManufacturerId,
    pub brand: BrandId,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
    #[serde(skip)]
    pub user: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub manufacturer: Option<Option<ManufacturerId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub brand: Option<Option<BrandId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CatalogEntity for Product {
    const NAME: &'static str = "product";
    type Input = ProductInput;

    fn create(input: Self::Input, owner: UserId, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let mode = WriteMode::Full;
        let mut errors = FieldErrors::new();
        let name = fields::required_text(&mut errors, "name", input.name, MAX_NAME_LEN, mode);
        let manufacturer = fields::non_null(&mut errors, "manufacturer", input.manufacturer, mode);
        let brand = fields::non_null(&mut errors, "brand", input.brand, mode);

        match (name, manufacturer, brand) {
            (Some(name), Some(manufacturer), Some(brand)) if errors.is_empty() => Ok(Self {
                id: ProductId::new(),
                name,
                manufacturer,
                brand,
                description: input.description.flatten(),
                date_added: now,
                user: owner,
            }),
            _ => Err(errors),
        }
    }

    fn apply(&mut self, input: Self::Input, mode: WriteMode) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = fields::required_text(&mut errors, "name", input.name, MAX_NAME_LEN, mode);
        let manufacturer = fields::non_null(&mut errors, "manufacturer", input.manufacturer, mode);
        let brand = fields::non_null(&mut errors, "brand", input.brand, mode);
        errors.into_result(())?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(manufacturer) = manufacturer {
            self.manufacturer = manufacturer;
        }
        if let Some(brand) = brand {
            self.brand = brand;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        Ok(())
    }

    fn owner(&self) -> UserId {
        self.user
    }

    fn date_added(&self) -> DateTime<Utc> {
        self.date_added
    }
}
