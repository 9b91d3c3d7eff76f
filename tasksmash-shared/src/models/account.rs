/// Account model and database operations
///
/// Accounts hold identity (username, email) and the Argon2id credential hash.
/// Both username and email are globally unique; email comparison is
/// case-insensitive because emails are lowercased before they reach the store.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(50) NOT NULL,
///     email VARCHAR(100) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT accounts_username_key UNIQUE (username),
///     CONSTRAINT accounts_email_key UNIQUE (email)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasksmash_shared::models::account::{Account, CreateAccount};
/// use tasksmash_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let account = Account::create(&pool, CreateAccount {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = Account::find_by_username(&pool, "alice").await?;
/// assert_eq!(found.map(|a| a.id), Some(account.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Account identifier
pub type AccountId = i64;

/// Registered account
///
/// The credential hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Store-assigned identifier
    pub id: AccountId,

    /// Unique login name
    pub username: String,

    /// Unique, lowercased email address
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the account was registered
    pub created_at: DateTime<Utc>,

    /// When the credential last changed
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Login name (already validated)
    pub username: String,

    /// Lowercased email (already validated)
    pub email: String,

    /// Argon2id hash, never plaintext
    pub password_hash: String,
}

/// Public projection used in listings (suggestions, followers)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub username: String,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        AccountSummary {
            id: account.id,
            username: account.username.clone(),
        }
    }
}

impl Account {
    /// Inserts a new account
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `accounts_username_key` or
    /// `accounts_email_key` when the username or email is taken.
    pub async fn create<'e, E>(executor: E, data: CreateAccount) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(executor)
        .await
    }

    /// Finds an account by ID
    pub async fn find_by_id<'e, E>(executor: E, id: AccountId) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Finds an account by its exact username
    pub async fn find_by_username<'e, E>(
        executor: E,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(executor)
        .await
    }

    /// Finds an account by email (callers pass the lowercased address)
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(executor)
        .await
    }

    /// Replaces the credential hash
    ///
    /// Returns false when the account does not exist.
    pub async fn update_password_hash<'e, E>(
        executor: E,
        id: AccountId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every account except `viewer` and the accounts `viewer` follows
    ///
    /// Ordered by username so the result is stable for a fixed graph.
    pub async fn list_suggested<'e, E>(
        executor: E,
        viewer: AccountId,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.username, a.email, a.password_hash, a.created_at, a.updated_at
            FROM accounts a
            WHERE a.id <> $1
              AND NOT EXISTS (
                  SELECT 1 FROM follows f
                  WHERE f.follower_id = $1 AND f.followee_id = a.id
              )
            ORDER BY a.username COLLATE "C" ASC
            "#,
        )
        .bind(viewer)
        .fetch_all(executor)
        .await
    }

    /// Deletes an account row
    ///
    /// Dependent rows are removed by the store's cascade routine before this
    /// runs; the schema's `ON DELETE CASCADE` clauses catch anything left.
    pub async fn delete<'e, E>(executor: E, id: AccountId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
