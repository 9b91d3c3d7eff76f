/// Follow edge model and database operations
///
/// A follow edge is a directed relation: the follower's dashboard surfaces the
/// followee's tasks. The pair is the primary key, so there is at most one edge
/// per (follower, followee), and a check constraint rejects self-follows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE follows (
///     follower_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     followee_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (follower_id, followee_id),
///     CONSTRAINT follows_no_self_follow CHECK (follower_id <> followee_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::account::{Account, AccountId};

/// Directed follow edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub follower_id: AccountId,
    pub followee_id: AccountId,
    pub created_at: DateTime<Utc>,
}

/// Result of a follow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    /// A new edge was created
    Followed,

    /// The edge already existed; nothing changed
    AlreadyFollowing,
}

/// Result of an unfollow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnfollowOutcome {
    /// The edge was removed
    Unfollowed,

    /// There was no edge; nothing changed
    NotFollowing,
}

impl Follow {
    /// Inserts an edge unless it already exists
    ///
    /// Returns true when a row was written.
    pub async fn insert<'e, E>(
        executor: E,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes an edge, returning true if one existed
    pub async fn delete<'e, E>(
        executor: E,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower_id)
            .bind(followee_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether the edge exists
    pub async fn exists<'e, E>(
        executor: E,
        follower_id: AccountId,
        followee_id: AccountId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(executor)
        .await
    }

    /// Accounts that `follower_id` follows, by username
    pub async fn list_followees<'e, E>(
        executor: E,
        follower_id: AccountId,
    ) -> Result<Vec<Account>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.username, a.email, a.password_hash, a.created_at, a.updated_at
            FROM follows f
            JOIN accounts a ON a.id = f.followee_id
            WHERE f.follower_id = $1
            ORDER BY a.username COLLATE "C" ASC
            "#,
        )
        .bind(follower_id)
        .fetch_all(executor)
        .await
    }

    /// Accounts following `followee_id`, by username
    pub async fn list_followers<'e, E>(
        executor: E,
        followee_id: AccountId,
    ) -> Result<Vec<Account>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.username, a.email, a.password_hash, a.created_at, a.updated_at
            FROM follows f
            JOIN accounts a ON a.id = f.follower_id
            WHERE f.followee_id = $1
            ORDER BY a.username COLLATE "C" ASC
            "#,
        )
        .bind(followee_id)
        .fetch_all(executor)
        .await
    }

    /// Removes every edge touching an account, in either direction
    pub async fn delete_for_account<'e, E>(
        executor: E,
        account_id: AccountId,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 OR followee_id = $1")
            .bind(account_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&FollowOutcome::AlreadyFollowing).unwrap(),
            "\"already_following\""
        );
        assert_eq!(
            serde_json::to_string(&UnfollowOutcome::NotFollowing).unwrap(),
            "\"not_following\""
        );
    }
}
