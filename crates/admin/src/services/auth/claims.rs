//! Role lookup in session token claims.
//!
//! Clerk can be configured to embed the role in different places of the
//! session token. Each location is a named [`ClaimStrategy`]; strategies are
//! evaluated in [`CLAIM_STRATEGIES`] order and the first non-empty string wins.

use clerk_admin_core::Role;

use crate::models::SessionClaims;

/// A named, pure extraction of a role from session claims.
#[derive(Clone, Copy)]
pub struct ClaimStrategy {
    /// Name used in logs.
    pub name: &'static str,
    extract: for<'c> fn(&'c SessionClaims) -> Option<&'c str>,
}

impl ClaimStrategy {
    /// Apply this strategy, ignoring empty values.
    #[must_use]
    pub fn extract<'c>(&self, claims: &'c SessionClaims) -> Option<&'c str> {
        (self.extract)(claims).filter(|role| !role.is_empty())
    }
}

impl std::fmt::Debug for ClaimStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ClaimStrategy").field(&self.name).finish()
    }
}

/// Claim locations, highest priority first.
pub const CLAIM_STRATEGIES: &[ClaimStrategy] = &[
    ClaimStrategy {
        name: "private_metadata",
        extract: private_metadata_role,
    },
    ClaimStrategy {
        name: "metadata",
        extract: metadata_role,
    },
    ClaimStrategy {
        name: "public_metadata",
        extract: public_metadata_role,
    },
];

fn private_metadata_role(claims: &SessionClaims) -> Option<&str> {
    nested_role(claims, "privateMetadata")
}

fn metadata_role(claims: &SessionClaims) -> Option<&str> {
    nested_role(claims, "metadata")
}

fn public_metadata_role(claims: &SessionClaims) -> Option<&str> {
    nested_role(claims, "publicMetadata")
}

/// `claims[object].role` when it is a string.
fn nested_role<'c>(claims: &'c SessionClaims, object: &str) -> Option<&'c str> {
    claims.get(object)?.get("role")?.as_str()
}

/// Find the role embedded in the claims, along with the strategy that found it.
#[must_use]
pub fn role_from_claims(claims: &SessionClaims) -> Option<(&'static str, Role)> {
    CLAIM_STRATEGIES.iter().find_map(|strategy| {
        strategy
            .extract(claims)
            .map(|role| (strategy.name, Role::from(role)))
    })
}
