//! Task list domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clerk_admin_core::TaskId;

/// A task list entry.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
