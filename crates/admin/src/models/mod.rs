//! Domain models for admin.
//!
//! - [`identity`] - The signed-in user as seen by this app
//! - [`chat_permission`] - Per-user chat access records
//! - [`task`] - Task list entries

pub mod chat_permission;
pub mod identity;
pub mod task;

pub use chat_permission::{ChatPermission, PermissionGrant};
pub use identity::{Identity, SessionClaims, UserProfile};
pub use task::Task;
