use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use catalog_core::{Entity, FieldErrors, UserId, WriteMode};

/// A writable catalog record.
///
/// Every catalog record has a server-assigned id, an owner (the user who
/// created it) and a creation timestamp. `Input` is the client payload for
/// create, replace and partial update; every field in it is optional so that
/// [`WriteMode`] alone decides what is required.
pub trait CatalogEntity: Entity + Clone + Serialize + Send + Sync + 'static {
    /// Singular resource name, used in routes, logs and conflict messages.
    const NAME: &'static str;

    type Input: DeserializeOwned + Send + 'static;

    /// Validate `input` in [`WriteMode::Full`] and build a new record.
    fn create(input: Self::Input, owner: UserId, now: DateTime<Utc>) -> Result<Self, FieldErrors>;

    /// Validate `input` and apply it. Nothing is modified on error.
    fn apply(&mut self, input: Self::Input, mode: WriteMode) -> Result<(), FieldErrors>;

    fn owner(&self) -> UserId;

    fn date_added(&self) -> DateTime<Utc>;
}
