use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::fields::{self, MAX_NAME_LEN, nullable};
use catalog_core::{CategoryId, Entity, FieldErrors, UserId, WriteMode};

use crate::CatalogEntity;

pub const SELF_PARENT_MESSAGE: &str = "A category cannot be its own parent.";

/// A category, optionally nested under a parent category. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_category: Option<CategoryId>,
    pub date_added: DateTime<Utc>,
    #[serde(skip)]
    pub user: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    /// Absent keeps the current parent, `null` detaches.
    #[serde(default, deserialize_with = "nullable")]
    pub parent_category: Option<Option<CategoryId>>,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CatalogEntity for Category {
    const NAME: &'static str = "category";
    type Input = CategoryInput;

    fn create(input: Self::Input, owner: UserId, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = fields::required_text(&mut errors, "name", input.name, MAX_NAME_LEN, WriteMode::Full);

        match name {
            Some(name) if errors.is_empty() => Ok(Self {
                id: CategoryId::new(),
                name,
                parent_category: input.parent_category.flatten(),
                date_added: now,
                user: owner,
            }),
            _ => Err(errors),
        }
    }

    fn apply(&mut self, input: Self::Input, mode: WriteMode) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = fields::required_text(&mut errors, "name", input.name, MAX_NAME_LEN, mode);
        if input.parent_category == Some(Some(self.id)) {
            errors.add("parent_category", SELF_PARENT_MESSAGE);
        }
        errors.into_result(())?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(parent) = input.parent_category {
            self.parent_category = parent;
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
