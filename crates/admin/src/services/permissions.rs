//! Chat permission administration.
//!
//! Every operation is gated by [`RoleResolver::require_admin`] and surfaces
//! store failures; nothing here fails closed. Callers that already hold an
//! [`AdminIdentity`] use the `*_as` variants, which skip the role lookup.

use thiserror::Error;
use tracing::instrument;

use clerk_admin_core::{EmptyUserId, UserId};

use crate::db::RepositoryError;
use crate::models::{ChatPermission, Identity, PermissionGrant};
use crate::ports::{IdentityProvider, PermissionStore};

use super::auth::{AdminIdentity, AuthError, RoleResolver};

/// Errors from chat permission administration.
#[derive(Debug, Error)]
pub enum PermissionAdminError {
    /// Caller is not a signed-in admin.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Target user ID is blank.
    #[error("user ID is required")]
    InvalidUserId(#[from] EmptyUserId),

    /// The permission store failed.
    #[error("failed to update chat permissions: {0}")]
    Store(#[from] RepositoryError),
}

/// Grants, revokes and lists chat permissions on behalf of an admin.
pub struct ChatPermissionService<'a> {
    resolver: RoleResolver<'a>,
    store: &'a dyn PermissionStore,
}

impl<'a> ChatPermissionService<'a> {
    /// Create a new chat permission service.
    #[must_use]
    pub const fn new(provider: &'a dyn IdentityProvider, store: &'a dyn PermissionStore) -> Self {
        Self {
            resolver: RoleResolver::new(provider, store),
            store,
        }
    }

    /// Enable chat for `target`, recording the acting admin and notes.
    ///
    /// Granting again overwrites `granted_by`, `notes` and `granted_at`.
    ///
    /// # Errors
    ///
    /// Returns `PermissionAdminError::Auth` if `actor` is not an admin,
    /// `PermissionAdminError::InvalidUserId` for a blank target, and
    /// `PermissionAdminError::Store` if the write fails.
    pub async fn grant(
        &self,
        actor: Option<&Identity>,
        target: &str,
        notes: Option<&str>,
    ) -> Result<ChatPermission, PermissionAdminError> {
        let admin = self.resolver.require_admin(actor).await?;
        self.grant_as(&admin, target, notes).await
    }

    /// [`Self::grant`] for an already verified admin.
    ///
    /// # Errors
    ///
    /// Returns `PermissionAdminError::InvalidUserId` for a blank target and
    /// `PermissionAdminError::Store` if the write fails.
    #[instrument(skip(self, admin, notes), fields(admin_id = %admin.user_id, target = %target))]
    pub async fn grant_as(
        &self,
        admin: &AdminIdentity,
        target: &str,
        notes: Option<&str>,
    ) -> Result<ChatPermission, PermissionAdminError> {
        let target = UserId::parse(target)?;

        let grant = PermissionGrant::now(target, Some(admin.user_id.clone()), notes);
        let record = self.store.upsert_permission(&grant).await?;

        tracing::info!(user_id = %record.user_id, "Chat permission granted");
        Ok(record)
    }

    /// Disable chat for `target`, keeping the record.
    ///
    /// Returns whether a record existed. Revoking a user who was never
    /// granted is not an error.
    ///
    /// # Errors
    ///
    /// Returns `PermissionAdminError::Auth` if `actor` is not an admin,
    /// `PermissionAdminError::InvalidUserId` for a blank target, and
    /// `PermissionAdminError::Store` if the write fails.
    pub async fn revoke(
        &self,
        actor: Option<&Identity>,
        target: &str,
    ) -> Result<bool, PermissionAdminError> {
        let admin = self.resolver.require_admin(actor).await?;
        self.revoke_as(&admin, target).await
    }

    /// [`Self::revoke`] for an already verified admin.
    ///
    /// # Errors
    ///
    /// Returns `PermissionAdminError::InvalidUserId` for a blank target and
    /// `PermissionAdminError::Store` if the write fails.
    #[instrument(skip(self, admin), fields(admin_id = %admin.user_id, target = %target))]
    pub async fn revoke_as(
        &self,
        admin: &AdminIdentity,
        target: &str,
    ) -> Result<bool, PermissionAdminError> {
        let target = UserId::parse(target)?;

        let existed = self.store.set_enabled(&target, false).await?;
        if existed {
            tracing::info!(user_id = %target, "Chat permission revoked");
        } else {
            tracing::info!(user_id = %target, "No chat permission to revoke");
        }
        Ok(existed)
    }

    /// All permission records, newest grant first.
    ///
    /// # Errors
    ///
    /// Returns `PermissionAdminError::Auth` if `actor` is not an admin and
    /// `PermissionAdminError::Store` if the read fails.
    pub async fn list(
        &self,
        actor: Option<&Identity>,
    ) -> Result<Vec<ChatPermission>, PermissionAdminError> {
        let admin = self.resolver.require_admin(actor).await?;
        self.list_as(&admin).await
    }

    /// [`Self::list`] for an already verified admin.
    ///
    /// # Errors
    ///
    /// Returns `PermissionAdminError::Store` if the read fails.
    pub async fn list_as(
        &self,
        _admin: &AdminIdentity,
    ) -> Result<Vec<ChatPermission>, PermissionAdminError> {
        Ok(self.store.list_permissions().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{FakeIdentityProvider, InMemoryPermissionStore, identity, user};

    fn admin() -> Identity {
        identity("user_admin", json!({ "metadata": { "role": "admin" } }))
    }

    #[tokio::test]
    async fn test_grant_creates_enabled_record() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::default();
        let service = ChatPermissionService::new(&provider, &store);
        let admin = admin();

        let record = service
            .grant(Some(&admin), " user_1 ", Some("beta tester"))
            .await
            .unwrap();

        assert_eq!(record.user_id, user("user_1"));
        assert!(record.enabled);
        assert_eq!(record.granted_by, Some(user("user_admin")));
        assert_eq!(record.notes.as_deref(), Some("beta tester"));
    }

    #[tokio::test]
    async fn test_grant_twice_keeps_one_record_with_latest_details() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::default();
        let service = ChatPermissionService::new(&provider, &store);
        let first = admin();
        let second = identity("user_other_admin", json!({ "metadata": { "role": "admin" } }));

        service
            .grant(Some(&first), "user_1", Some("first"))
            .await
            .unwrap();
        service
            .grant(Some(&second), "user_1", Some("second"))
            .await
            .unwrap();

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].enabled);
        assert_eq!(rows[0].granted_by, Some(user("user_other_admin")));
        assert_eq!(rows[0].notes.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_revoke_twice_keeps_one_disabled_record() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::with_permission("user_1", true);
        let service = ChatPermissionService::new(&provider, &store);
        let admin = admin();

        assert!(service.revoke(Some(&admin), "user_1").await.unwrap());
        assert!(service.revoke(Some(&admin), "user_1").await.unwrap());

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].enabled);
    }

    #[tokio::test]
    async fn test_revoke_without_record_is_noop() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::default();
        let service = ChatPermissionService::new(&provider, &store);

        assert!(!service.revoke(Some(&admin()), "user_1").await.unwrap());
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_non_admin_cannot_mutate() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::default();
        let service = ChatPermissionService::new(&provider, &store);
        let member = identity("user_1", json!({ "metadata": { "role": "user" } }));

        assert!(matches!(
            service.grant(Some(&member), "user_1", None).await,
            Err(PermissionAdminError::Auth(AuthError::Forbidden))
        ));
        assert!(matches!(
            service.revoke(None, "user_1").await,
            Err(PermissionAdminError::Auth(AuthError::Unauthenticated))
        ));
        assert!(matches!(
            service.list(Some(&member)).await,
            Err(PermissionAdminError::Auth(AuthError::Forbidden))
        ));
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_verified_admin_skips_repeat_role_lookup() {
        // No role claim: only the profile lookup can make this user an admin.
        let provider = FakeIdentityProvider::with_role("admin");
        let store = InMemoryPermissionStore::default();
        let service = ChatPermissionService::new(&provider, &store);
        let resolver = RoleResolver::new(&provider, &store);
        let actor = identity("user_admin", json!({}));

        let admin = resolver.require_admin(Some(&actor)).await.unwrap();
        assert_eq!(provider.calls(), 1);

        let record = service.grant_as(&admin, "user_1", None).await.unwrap();
        assert_eq!(record.granted_by, Some(user("user_admin")));
        assert!(service.revoke_as(&admin, "user_1").await.unwrap());
        assert_eq!(service.list_as(&admin).await.unwrap().len(), 1);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_target_rejected() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::default();
        let service = ChatPermissionService::new(&provider, &store);

        assert!(matches!(
            service.grant(Some(&admin()), "   ", None).await,
            Err(PermissionAdminError::InvalidUserId(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::failing();
        let service = ChatPermissionService::new(&provider, &store);

        assert!(matches!(
            service.grant(Some(&admin()), "user_1", None).await,
            Err(PermissionAdminError::Store(_))
        ));
        assert!(matches!(
            service.list(Some(&admin())).await,
            Err(PermissionAdminError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let provider = FakeIdentityProvider::default();
        let store = InMemoryPermissionStore::default();
        let service = ChatPermissionService::new(&provider, &store);
        let admin = admin();

        service.grant(Some(&admin), "user_old", None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service.grant(Some(&admin), "user_new", None).await.unwrap();

        let ids: Vec<_> = service
            .list(Some(&admin))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.user_id.to_string())
            .collect();
        assert_eq!(ids, ["user_new", "user_old"]);
    }
}
