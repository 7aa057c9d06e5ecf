//! Field-level input validation shared by every writable resource.
//!
//! Inputs arrive with every field optional. [`WriteMode`] decides whether a
//! missing field is an error (create / full replace) or simply left alone
//! (partial update).

use serde::{Deserialize, Deserializer};

use crate::FieldErrors;

/// Maximum length of free-text name columns.
pub const MAX_NAME_LEN: usize = 255;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriteMode {
    /// Every required field must be supplied (POST, PUT).
    Full,
    /// Only supplied fields are validated and applied (PATCH).
    Partial,
}

impl WriteMode {
    pub fn is_partial(self) -> bool {
        matches!(self, Self::Partial)
    }
}

/// Take a required field; records [`REQUIRED`] when it is missing in
/// [`WriteMode::Full`].
pub fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>, mode: WriteMode) -> Option<T> {
    if value.is_none() && !mode.is_partial() {
        errors.add(field, REQUIRED);
    }
    value
}

/// Take a required field that was deserialized with [`nullable`]; an explicit
/// `null` is rejected with [`NULL`] in either mode.
pub fn non_null<T>(errors: &mut FieldErrors, field: &str, value: Option<Option<T>>, mode: WriteMode) -> Option<T> {
    match required(errors, field, value, mode) {
        Some(Some(v)) => Some(v),
        Some(None) => {
            errors.add(field, NULL);
            None
        }
        None => None,
    }
}

/// Validate a bounded, non-blank text value.
pub fn text(errors: &mut FieldErrors, field: &str, value: String, max_len: usize) -> Option<String> {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() > max_len {
        errors.add(field, format!("Ensure this field has no more than {max_len} characters."));
        return None;
    }
    Some(value)
}

/// Required, non-null, bounded, non-blank text.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<String>>,
    max_len: usize,
    mode: WriteMode,
) -> Option<String> {
    non_null(errors, field, value, mode).and_then(|v| text(errors, field, v, max_len))
}

/// Deserialize a nullable field so that an absent key and an explicit `null`
/// stay distinguishable: absent → `None`, `null` → `Some(None)`.
///
/// Use together with `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
