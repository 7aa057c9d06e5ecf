//! User identity: credentials, role flags and profile validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::fields::{self, REQUIRED};
use catalog_core::{Entity, FieldErrors, UserId, ValueObject, WriteMode};

use crate::RoleFlags;

pub const MOBILE_MESSAGE: &str = "mobile number must be 10 digits";
pub const NAME_MESSAGE: &str = "name should contain at least 6 letters";
pub const MIN_PASSWORD_LEN: usize = 5;

const MOBILE_LEN: usize = 10;
const NAME_MIN: usize = 6;
const NAME_MAX: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Value objects
// ─────────────────────────────────────────────────────────────────────────────

/// Mobile number used as the login identifier: exactly ten ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mobile(String);

impl Mobile {
    pub fn parse(value: impl Into<String>) -> Result<Self, &'static str> {
        let value = value.into();
        if value.len() == MOBILE_LEN && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value))
        } else {
            Err(MOBILE_MESSAGE)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Mobile {}

impl TryFrom<String> for Mobile {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Mobile> for String {
    fn from(value: Mobile) -> Self {
        value.0
    }
}

impl core::fmt::Display for Mobile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name: 6 to 100 ASCII letters or digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    pub fn parse(value: impl Into<String>) -> Result<Self, &'static str> {
        let value = value.into();
        let valid_len = (NAME_MIN..=NAME_MAX).contains(&value.len());
        if valid_len && value.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(Self(value))
        } else {
            Err(NAME_MESSAGE)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for UserName {}

impl TryFrom<String> for UserName {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl core::fmt::Display for UserName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A stored user.
///
/// # Invariants
/// - `mobile` is unique across users (enforced by the store).
/// - `password_hash` is an argon2 PHC string, never the raw password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub mobile: Mobile,
    pub name: UserName,
    pub password_hash: String,
    pub roles: RoleFlags,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(
        mobile: Mobile,
        name: UserName,
        password_hash: String,
        roles: RoleFlags,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            mobile,
            name,
            password_hash,
            roles,
            last_login: None,
            date_joined: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.roles.is_active
    }

    /// Apply validated profile changes. `password_hash` is the hash of
    /// `changes.password`, computed by the caller.
    pub fn apply(&mut self, changes: UserChanges, password_hash: Option<String>) {
        if let Some(mobile) = changes.mobile {
            self.mobile = mobile;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

/// Raw user fields as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub mobile: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Validated subset of user fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub mobile: Option<Mobile>,
    pub name: Option<UserName>,
    pub password: Option<String>,
}

/// Everything needed to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub mobile: Mobile,
    pub name: UserName,
    pub password: String,
}

impl UserInput {
    pub fn validate(self, mode: WriteMode) -> Result<UserChanges, FieldErrors> {
        let mut errors = FieldErrors::new();

        let mobile = fields::required(&mut errors, "mobile", self.mobile, mode).and_then(|m| {
            Mobile::parse(m).map_err(|msg| errors.add("mobile", msg)).ok()
        });
        let name = fields::required(&mut errors, "name", self.name, mode).and_then(|n| {
            UserName::parse(n).map_err(|msg| errors.add("name", msg)).ok()
        });
        let password = fields::required(&mut errors, "password", self.password, mode).and_then(|p| {
            if p.chars().count() < MIN_PASSWORD_LEN {
                errors.add(
                    "password",
                    format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."),
                );
                None
            } else {
                Some(p)
            }
        });

        errors.into_result(UserChanges {
            mobile,
            name,
            password,
        })
    }

    pub fn validate_new(self) -> Result<NewUser, FieldErrors> {
        let changes = self.validate(WriteMode::Full)?;
        match (changes.mobile, changes.name, changes.password) {
            (Some(mobile), Some(name), Some(password)) => Ok(NewUser {
                mobile,
                name,
                password,
            }),
            (None, _, _) => Err(FieldErrors::single("mobile", REQUIRED)),
            (_, None, _) => Err(FieldErrors::single("name", REQUIRED)),
            (_, _, None) => Err(FieldErrors::single("password", REQUIRED)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(mobile: &str, name: &str, password: &str) -> UserInput {
        UserInput {
            mobile: Some(mobile.into()),
            password: Some(password.into()),
            name: Some(name.into()),
        }
    }

    #[test]
    fn valid_registration_passes() {
        let new = input("9876543210", "validname", "secret123").validate_new().unwrap();
        assert_eq!(new.mobile.as_str(), "9876543210");
        assert_eq!(new.name.as_str(), "validname");
        assert_eq!(new.password, "secret123");
    }

    #[test]
    fn every_field_is_required_on_create() {
        let errors = UserInput::default().validate_new().unwrap_err();
        for field in ["mobile", "name", "password"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]), "{field}");
        }
    }

    #[test]
    fn partial_update_ignores_missing_fields() {
        let changes = UserInput {
            name: Some("renamed1".into()),
            ..Default::default()
        }
        .validate(WriteMode::Partial)
        .unwrap();

        assert_eq!(changes.mobile, None);
        assert_eq!(changes.name.unwrap().as_str(), "renamed1");
        assert_eq!(changes.password, None);
    }

    #[test]
    fn short_name_and_password_are_rejected() {
        let errors = input("9876543210", "abc", "1234").validate_new().unwrap_err();
        assert_eq!(errors.get("name"), Some(&[NAME_MESSAGE.to_string()][..]));
        assert_eq!(
            errors.get("password"),
            Some(&["Ensure this field has at least 5 characters.".to_string()][..])
        );
        assert!(errors.get("mobile").is_none());
    }

    #[test]
    fn name_rejects_non_alphanumerics_and_overlong_values() {
        assert!(UserName::parse("valid name").is_err());
        assert!(UserName::parse("a".repeat(101)).is_err());
        assert!(UserName::parse("a".repeat(100)).is_ok());
    }

    #[test]
    fn apply_only_touches_supplied_fields() {
        let mut user = User::new(
            Mobile::parse("9876543210").unwrap(),
            UserName::parse("validname").unwrap(),
            "hash".into(),
            RoleFlags::member(),
            Utc::now(),
        );
        let changes = UserChanges {
            name: Some(UserName::parse("newname1").unwrap()),
            ..Default::default()
        };
        user.apply(changes, None);

        assert_eq!(user.mobile.as_str(), "9876543210");
        assert_eq!(user.name.as_str(), "newname1");
        assert_eq!(user.password_hash, "hash");
    }

    proptest! {
        #[test]
        fn ten_digit_mobiles_are_accepted(mobile in "[0-9]{10}") {
            prop_assert!(Mobile::parse(mobile).is_ok());
        }

        #[test]
        fn anything_else_is_rejected(mobile in "\\PC{0,14}") {
            let is_ten_digits = mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit());
            prop_assume!(!is_ten_digits);

            let errors = input(&mobile, "validname", "secret123").validate_new().unwrap_err();
            prop_assert_eq!(errors.get("mobile"), Some(&[MOBILE_MESSAGE.to_string()][..]));
        }

        #[test]
        fn wrong_length_digit_strings_are_rejected(mobile in "[0-9]{0,9}|[0-9]{11,15}") {
            prop_assert_eq!(Mobile::parse(mobile), Err(MOBILE_MESSAGE));
        }
    }
}
