//! User role classification.

use serde::{Deserialize, Serialize};

/// Coarse authorization role of an identity.
///
/// The set is open: the identity provider stores free-form strings, so any
/// value other than `admin` or `user` is kept verbatim in [`Role::Other`].
/// Matching is case-sensitive; `"Admin"` is not an admin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Full access, including the admin console.
    Admin,
    /// Regular signed-in user.
    User,
    /// Any other role string.
    Other(String),
}

impl Role {
    /// Returns `true` only for the exact `admin` role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// The role as stored by the identity provider.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            "user" => Self::User,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "admin" => Self::Admin,
            "user" => Self::User,
            _ => Self::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}
