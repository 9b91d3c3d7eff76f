/// Database models for TaskSmash
///
/// Each model owns its SQL. Functions take any `PgExecutor`, so they run
/// equally against the pool or inside a transaction.
///
/// # Models
///
/// - `account`: identity and credential hash
/// - `task`: to-do items owned by one account
/// - `comment`: threaded comments on a task, plus the in-memory thread index
/// - `follow`: directed follow edges between accounts
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
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod comment;
pub mod follow;
pub mod task;
