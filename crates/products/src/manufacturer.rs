use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::fields::{self, MAX_NAME_LEN, nullable};
use catalog_core::{Entity, FieldErrors, ManufacturerId, UserId, WriteMode};

use crate::CatalogEntity;

/// A manufacturer. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
    pub date_added: DateTime<Utc>,
    #[serde(skip)]
    pub user: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManufacturerInput {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
}

impl Entity for Manufacturer {
    type Id = ManufacturerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CatalogEntity for Manufacturer {
    const NAME: &'static str = "manufacturer";
    type Input = ManufacturerInput;

    fn create(input: Self::Input, owner: UserId, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = fields::required_text(&mut errors, "name", input.name, MAX_NAME_LEN, WriteMode::Full);

        match name {
            Some(name) if errors.is_empty() => Ok(Self {
                id: ManufacturerId::new(),
                name,
                date_added: now,
                user: owner,
            }),
            _ => Err(errors),
        }
    }

    fn apply(&mut self, input: Self::Input, mode: WriteMode) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = fields::required_text(&mut errors, "name", input.name, MAX_NAME_LEN, mode);
        errors.into_result(())?;

        if let Some(name) = name {
            self.name = name;
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
