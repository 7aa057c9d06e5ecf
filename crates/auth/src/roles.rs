use serde::{Deserialize, Serialize};

/// Role flags carried by every user.
///
/// Flags are independent booleans rather than a hierarchy: a user can be an
/// executive without being staff, and the policies in
/// [`crate::permissions`] look at exactly the flag they care about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleFlags {
    pub is_active: bool,
    pub is_staff: bool,
    pub is_executive: bool,
    pub is_superuser: bool,
}

impl RoleFlags {
    /// Flags of a freshly registered user: active, nothing else.
    pub const fn member() -> Self {
        Self {
            is_active: true,
            is_staff: false,
            is_executive: false,
            is_superuser: false,
        }
    }

    /// Full catalog write access, no user administration.
    pub const fn executive() -> Self {
        Self {
            is_executive: true,
            ..Self::member()
        }
    }

    /// Every flag set.
    pub const fn superuser() -> Self {
        Self {
            is_active: true,
            is_staff: true,
            is_executive: true,
            is_superuser: true,
        }
    }

    /// Flags of an unauthenticated caller; no flag is ever granted.
    pub const fn none() -> Self {
        Self {
            is_active: false,
            is_staff: false,
            is_executive: false,
            is_superuser: false,
        }
    }
}

impl Default for RoleFlags {
    fn default() -> Self {
        Self::member()
    }
}
