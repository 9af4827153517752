//! Chat permission repository for database operations.
//!
//! One row per user, keyed on `user_id`. Grants upsert; revokes only flip
//! `enabled` so the grant history is never lost.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clerk_admin_core::UserId;

use super::RepositoryError;
use crate::models::{ChatPermission, PermissionGrant};
use crate::ports::PermissionStore;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` chat permission queries.
#[derive(Debug, sqlx::FromRow)]
struct ChatPermissionRow {
    user_id: String,
    enabled: bool,
    granted_at: DateTime<Utc>,
    granted_by: Option<String>,
    notes: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChatPermissionRow> for ChatPermission {
    type Error = RepositoryError;

    fn try_from(row: ChatPermissionRow) -> Result<Self, Self::Error> {
        let user_id = UserId::parse(&row.user_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid user_id in database: {e}"))
        })?;
        // A blank granted_by is treated the same as NULL
        let granted_by = row
            .granted_by
            .as_deref()
            .and_then(|id| UserId::parse(id).ok());

        Ok(Self {
            user_id,
            enabled: row.enabled,
            granted_at: row.granted_at,
            granted_by,
            notes: row.notes,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for chat permission database operations.
pub struct ChatPermissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatPermissionRepository<'a> {
    /// Create a new chat permission repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the permission record for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, user_id: &UserId) -> Result<Option<ChatPermission>, RepositoryError> {
        let row = sqlx::query_as::<_, ChatPermissionRow>(
            r"
            SELECT user_id, enabled, granted_at, granted_by, notes, updated_at
            FROM chat_permissions
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Grant chat access, creating the record or overwriting the previous grant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, grant: &PermissionGrant) -> Result<ChatPermission, RepositoryError> {
        let row = sqlx::query_as::<_, ChatPermissionRow>(
            r"
            INSERT INTO chat_permissions (user_id, enabled, granted_at, granted_by, notes, updated_at)
            VALUES ($1, TRUE, $2, $3, $4, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET enabled = TRUE,
                granted_at = EXCLUDED.granted_at,
                granted_by = EXCLUDED.granted_by,
                notes = EXCLUDED.notes,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, enabled, granted_at, granted_by, notes, updated_at
            ",
        )
        .bind(grant.user_id.as_str())
        .bind(grant.at)
        .bind(grant.granted_by.as_ref().map(UserId::as_str))
        .bind(grant.notes.as_deref())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Set the `enabled` flag for an existing record.
    ///
    /// Returns `false` if the user has no record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_enabled(&self, user_id: &UserId, enabled: bool) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE chat_permissions
            SET enabled = $2, updated_at = NOW()
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_str())
        .bind(enabled)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all permission records, most recent grant first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<ChatPermission>, RepositoryError> {
        let rows = sqlx::query_as::<_, ChatPermissionRow>(
            r"
            SELECT user_id, enabled, granted_at, granted_by, notes, updated_at
            FROM chat_permissions
            ORDER BY granted_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl PermissionStore for ChatPermissionRepository<'_> {
    async fn get_permission(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ChatPermission>, RepositoryError> {
        self.get(user_id).await
    }

    async fn upsert_permission(
        &self,
        grant: &PermissionGrant,
    ) -> Result<ChatPermission, RepositoryError> {
        self.upsert(grant).await
    }

    async fn set_enabled(&self, user_id: &UserId, enabled: bool) -> Result<bool, RepositoryError> {
        Self::set_enabled(self, user_id, enabled).await
    }

    async fn list_permissions(&self) -> Result<Vec<ChatPermission>, RepositoryError> {
        self.list_all().await
    }
}
