//! Entity trait: identity + continuity across state changes.

use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::str::FromStr;

use crate::DomainError;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy
        + Eq
        + Ord
        + Hash
        + Debug
        + Display
        + FromStr<Err = DomainError>
        + Send
        + Sync
        + 'static;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
