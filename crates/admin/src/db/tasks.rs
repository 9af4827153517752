//! Database operations for the task list.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clerk_admin_core::TaskId;

use super::RepositoryError;
use crate::models::Task;

/// Internal row type for `PostgreSQL` task queries.
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId::new(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Repository for task database operations.
pub struct TaskRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a task.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, name: &str) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r"
            INSERT INTO tasks (name)
            VALUES ($1)
            RETURNING id, name, created_at
            ",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List the most recent tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT id, name, created_at
            FROM tasks
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
