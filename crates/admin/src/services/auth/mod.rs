//! Role and chat permission resolution.
//!
//! The role comes from the session token claims when present (no I/O) and
//! otherwise from the identity provider's user profile. Read-only checks fail
//! closed: provider or store outages resolve to "no role" / "no permission"
//! and never interrupt page rendering. Only [`RoleResolver::require_admin`]
//! returns an error, for callers about to perform a privileged mutation.

mod claims;
mod error;

pub use claims::{CLAIM_STRATEGIES, ClaimStrategy, role_from_claims};
pub use error::AuthError;

use std::ops::Deref;

use tracing::instrument;

use clerk_admin_core::{Resolution, Role};

use crate::models::Identity;
use crate::ports::{IdentityProvider, PermissionStore};

/// An identity whose `admin` role has already been checked.
///
/// Only [`RoleResolver::require_admin`] builds one, so holding it is proof of
/// the check and later steps of the same request can skip the role lookup.
#[derive(Debug, Clone)]
pub struct AdminIdentity(Identity);

impl AdminIdentity {
    /// The underlying identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.0
    }
}

impl Deref for AdminIdentity {
    type Target = Identity;

    fn deref(&self) -> &Identity {
        &self.0
    }
}

/// Resolves roles and chat permission for a request's identity.
pub struct RoleResolver<'a> {
    provider: &'a dyn IdentityProvider,
    store: &'a dyn PermissionStore,
}

impl<'a> RoleResolver<'a> {
    /// Create a new resolver.
    #[must_use]
    pub const fn new(provider: &'a dyn IdentityProvider, store: &'a dyn PermissionStore) -> Self {
        Self { provider, store }
    }

    /// Resolve the identity's role.
    ///
    /// `Unresolved` covers a missing identity, a role that is unset everywhere,
    /// and a failed profile lookup.
    #[instrument(skip_all, fields(user_id = identity.map(|i| i.user_id.as_str())))]
    pub async fn resolve(&self, identity: Option<&Identity>) -> Resolution<Role> {
        let Some(identity) = identity else {
            return Resolution::Unresolved;
        };

        if let Some((strategy, role)) = role_from_claims(&identity.claims) {
            tracing::debug!(strategy, %role, "Role resolved from session claims");
            return Resolution::Resolved(role);
        }

        match self.provider.fetch_profile(&identity.user_id).await {
            Ok(profile) => profile
                .private_role
                .filter(|role| !role.is_empty())
                .map(Role::from)
                .into(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch user profile, treating role as unset");
                Resolution::Unresolved
            }
        }
    }

    /// Resolve the identity's role, `None` when unresolved.
    pub async fn resolve_role(&self, identity: Option<&Identity>) -> Option<Role> {
        self.resolve(identity).await.into_option()
    }

    /// Whether the identity's role is exactly `admin`.
    pub async fn is_admin(&self, identity: Option<&Identity>) -> bool {
        self.resolve_role(identity)
            .await
            .is_some_and(|role| role.is_admin())
    }

    /// Gate a privileged mutation on the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if there is no identity and
    /// `AuthError::Forbidden` if the role is not `admin`.
    pub async fn require_admin(
        &self,
        identity: Option<&Identity>,
    ) -> Result<AdminIdentity, AuthError> {
        let Some(identity) = identity else {
            return Err(AuthError::Unauthenticated);
        };
        if !self.is_admin(Some(identity)).await {
            return Err(AuthError::Forbidden);
        }
        Ok(AdminIdentity(identity.clone()))
    }

    /// Whether the identity may use the chat feature.
    ///
    /// Admins always may. Everyone else needs an enabled permission record; a
    /// missing record, a revoked one and a failed lookup all read as `false`.
    pub async fn check_chat_permission(&self, identity: Option<&Identity>) -> bool {
        if self.is_admin(identity).await {
            return true;
        }

        let Some(identity) = identity else {
            return false;
        };

        match self.store.get_permission(&identity.user_id).await {
            Ok(record) => record.is_some_and(|p| p.enabled),
            Err(e) => {
                tracing::warn!(
                    user_id = %identity.user_id,
                    error = %e,
                    "Failed to read chat permission, denying"
                );
                false
            }
        }
    }
}
