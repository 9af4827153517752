//! Chat permission management for operators.
//!
//! Writes go straight to the database; whoever can run this already holds
//! the database credentials, so no Clerk role check applies.
//!
//! # Usage
//!
//! ```bash
//! clerk-admin-cli permissions grant user_2abc --notes "beta tester"
//! clerk-admin-cli permissions revoke user_2abc
//! clerk-admin-cli permissions list
//! ```

use clerk_admin::db::ChatPermissionRepository;
use clerk_admin::models::PermissionGrant;
use clerk_admin_core::UserId;

use super::{CommandError, connect};

/// Grant chat access to a user.
///
/// # Errors
///
/// Returns an error if the user ID is blank or the write fails.
pub async fn grant(
    user_id: &str,
    granted_by: Option<&str>,
    notes: Option<&str>,
) -> Result<(), CommandError> {
    let user_id = UserId::parse(user_id)?;
    let granted_by = granted_by.map(UserId::parse).transpose()?;

    let pool = connect().await?;
    let record = ChatPermissionRepository::new(&pool)
        .upsert(&PermissionGrant::now(user_id, granted_by, notes))
        .await?;

    tracing::info!(user_id = %record.user_id, "Chat permission granted");
    Ok(())
}

/// Revoke chat access from a user.
///
/// # Errors
///
/// Returns an error if the user ID is blank or the write fails.
pub async fn revoke(user_id: &str) -> Result<(), CommandError> {
    let user_id = UserId::parse(user_id)?;

    let pool = connect().await?;
    if ChatPermissionRepository::new(&pool)
        .set_enabled(&user_id, false)
        .await?
    {
        tracing::info!(user_id = %user_id, "Chat permission revoked");
    } else {
        tracing::warn!(user_id = %user_id, "No chat permission record; nothing to revoke");
    }
    Ok(())
}

/// Print every permission record, newest grant first.
///
/// # Errors
///
/// Returns an error if the read fails.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let permissions = ChatPermissionRepository::new(&pool).list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<36} {:<8} {:<20} {:<36} NOTES", "USER", "ENABLED", "GRANTED", "BY");
        for p in &permissions {
            println!(
                "{:<36} {:<8} {:<20} {:<36} {}",
                p.user_id,
                p.enabled,
                p.granted_at.format("%Y-%m-%d %H:%M").to_string(),
                p.granted_by.as_ref().map_or("-", UserId::as_str),
                p.notes.as_deref().unwrap_or(""),
            );
        }
    }

    tracing::info!(count = permissions.len(), "Listed chat permissions");
    Ok(())
}
