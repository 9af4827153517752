//! Chat permission domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clerk_admin_core::UserId;

/// Persistent record gating a user's access to the chat feature.
///
/// At most one record exists per user. Revoking flips `enabled` rather than
/// deleting the row, so the grant history stays auditable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatPermission {
    /// User the permission applies to.
    pub user_id: UserId,
    /// Whether the user may currently use chat.
    pub enabled: bool,
    /// When the latest grant happened.
    pub granted_at: DateTime<Utc>,
    /// Admin who made the latest grant.
    pub granted_by: Option<UserId>,
    /// Free-form note from the granting admin.
    pub notes: Option<String>,
    /// Last grant or revoke.
    pub updated_at: DateTime<Utc>,
}

/// Input for upserting a grant.
#[derive(Debug, Clone)]
pub struct PermissionGrant {
    /// User receiving access.
    pub user_id: UserId,
    /// Admin granting access.
    pub granted_by: Option<UserId>,
    /// Optional note; blank notes are stored as `NULL`.
    pub notes: Option<String>,
    /// Timestamp used for both `granted_at` and `updated_at`.
    pub at: DateTime<Utc>,
}

impl PermissionGrant {
    /// Build a grant stamped with the current time.
    #[must_use]
    pub fn now(user_id: UserId, granted_by: Option<UserId>, notes: Option<&str>) -> Self {
        Self {
            user_id,
            granted_by,
            notes: notes
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(ToString::to_string),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_notes_become_none() {
        let user = UserId::parse("user_1").unwrap();
        assert_eq!(PermissionGrant::now(user.clone(), None, Some("   ")).notes, None);
        assert_eq!(PermissionGrant::now(user.clone(), None, None).notes, None);
        assert_eq!(
            PermissionGrant::now(user, None, Some(" beta tester ")).notes.as_deref(),
            Some("beta tester")
        );
    }
}
