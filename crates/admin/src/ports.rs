//! Seams to the external collaborators.
//!
//! Services depend on these traits rather than on the concrete Clerk,
//! Postgres and Gemini clients, so the authorization and fallback logic can
//! be exercised with in-memory fakes.

use async_trait::async_trait;

use clerk_admin_core::UserId;

use crate::clerk::ClerkError;
use crate::db::RepositoryError;
use crate::gemini::GeminiError;
use crate::models::{ChatPermission, PermissionGrant, UserProfile};

/// Authoritative user lookups at the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch the user's full profile.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, ClerkError>;
}

/// Storage for chat permission records.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Get the record for a user, if one exists.
    async fn get_permission(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ChatPermission>, RepositoryError>;

    /// Insert or replace the record for `grant.user_id` with an enabled grant.
    async fn upsert_permission(
        &self,
        grant: &PermissionGrant,
    ) -> Result<ChatPermission, RepositoryError>;

    /// Set the `enabled` flag of an existing record.
    ///
    /// Returns `false` if no record exists for the user.
    async fn set_enabled(&self, user_id: &UserId, enabled: bool) -> Result<bool, RepositoryError>;

    /// List all records, most recent grant first.
    async fn list_permissions(&self) -> Result<Vec<ChatPermission>, RepositoryError>;
}

/// A text generation backend addressed by model identifier.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text for `prompt` with a single model.
    async fn invoke(&self, model: &str, prompt: &str) -> Result<String, GeminiError>;
}
