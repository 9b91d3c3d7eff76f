/// Task model and database operations
///
/// A task is a to-do item owned by exactly one account. Only the owner edits
/// or deletes it; deleting it removes every comment attached to it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     owner_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     content VARCHAR(200) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasksmash_shared::models::task::{Task, CreateTask};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     owner_id: 1,
///     content: "Water the plants".to_string(),
/// }).await?;
///
/// let mine = Task::list_by_owner(&pool, 1).await?;
/// assert!(mine.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::account::AccountId;

/// Task identifier
pub type TaskId = i64;

/// To-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Store-assigned identifier
    pub id: TaskId,

    /// Owning account
    pub owner_id: AccountId,

    /// Task text (1-200 characters)
    pub content: String,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the content was last edited
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning account
    pub owner_id: AccountId,

    /// Task text (already validated)
    pub content: String,
}

impl Task {
    /// Inserts a new task
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, content)
            VALUES ($1, $2)
            RETURNING id, owner_id, content, created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.content)
        .fetch_one(executor)
        .await
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: TaskId) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, content, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Replaces a task's content
    ///
    /// Returns the updated task, or None if it no longer exists.
    pub async fn update_content<'e, E>(
        executor: E,
        id: TaskId,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(executor)
        .await
    }

    /// Lists tasks owned by an account in insertion order
    pub async fn list_by_owner<'e, E>(
        executor: E,
        owner_id: AccountId,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, content, created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(executor)
        .await
    }

    /// Lists tasks owned by the accounts `follower_id` follows
    ///
    /// Follow edges are unique per pair, so each task appears once. The
    /// viewer's own tasks are excluded even if a self-edge slipped in.
    pub async fn list_followed<'e, E>(
        executor: E,
        follower_id: AccountId,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.owner_id, t.content, t.created_at, t.updated_at
            FROM tasks t
            JOIN follows f ON f.followee_id = t.owner_id
            WHERE f.follower_id = $1
              AND t.owner_id <> $1
            ORDER BY t.created_at ASC, t.id ASC
            "#,
        )
        .bind(follower_id)
        .fetch_all(executor)
        .await
    }

    /// Deletes a task row
    ///
    /// Use the store's cascade routine rather than calling this directly, so
    /// the task's comments go in the same transaction.
    pub async fn delete<'e, E>(executor: E, id: TaskId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every task owned by an account, returning how many went
    pub async fn delete_by_owner<'e, E>(executor: E, owner_id: AccountId) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
            .bind(owner_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
