//! Identity types for the signed-in user.

use serde::{Deserialize, Serialize};

use clerk_admin_core::UserId;

/// Claims embedded in a verified session token.
///
/// Kept as raw JSON: which nested objects carry the role depends on how the
/// session token template is configured at the identity provider.
pub type SessionClaims = serde_json::Map<String, serde_json::Value>;

/// An authenticated user for the duration of one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Identity provider user ID (the token's `sub`).
    pub user_id: UserId,
    /// All claims from the session token.
    pub claims: SessionClaims,
}

impl Identity {
    /// Create an identity without any extra claims.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            claims: SessionClaims::new(),
        }
    }

    /// Attach session claims.
    #[must_use]
    pub fn with_claims(mut self, claims: SessionClaims) -> Self {
        self.claims = claims;
        self
    }
}

/// Authoritative user profile fetched from the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Role stored in the user's private metadata, if any.
    pub private_role: Option<String>,
}
