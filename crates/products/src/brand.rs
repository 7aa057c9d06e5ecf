use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::fields::{self, MAX_NAME_LEN, nullable};
use catalog_core::{BrandId, Entity, FieldErrors, ManufacturerId, UserId, WriteMode};

use crate::CatalogEntity;

/// A brand, always owned by a manufacturer. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub manufacturer: ManufacturerId,
    pub date_added: DateTime<Utc>,
    #[serde(skip)]
    pub user: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandInput {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub manufacturer: Option<Option<ManufacturerId>>,
}

impl Entity for Brand {
    type Id = BrandId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CatalogEntity for Brand {
    const NAME: &'static str = "brand";
    type Input = BrandInput;

    fn create(input: Self::Input, owner: UserId, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let mode = WriteMode::Full;
        let mut errors = FieldErrors::new();
        let name = fields::required_text(&mut errors, "name", input.name, MAX_NAME_LEN, mode);
        let manufacturer = fields::non_null(&mut errors, "manufacturer", input.manufacturer, mode);

        match (name, manufacturer) {
            (Some(name), Some(manufacturer)) if errors.is_empty() => Ok(Self {
                id: BrandId::new(),
                name,
                manufacturer,
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
        errors.into_result(())?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(manufacturer) = manufacturer {
            self.manufacturer = manufacturer;
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
