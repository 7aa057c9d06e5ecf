//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. In this
/// workspace they are the validated wrappers around user-supplied strings
/// (mobile numbers, display names), constructed only through a parsing
/// function that enforces the format.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
