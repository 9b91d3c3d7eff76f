/// Persistence seam
///
/// Services talk to storage only through [`Store`]. Two backends exist:
///
/// - [`postgres::PgStore`]: sqlx over PostgreSQL, delegating to the model
///   functions and wrapping multi-statement work in transactions
/// - [`memory::MemoryStore`]: everything behind one `tokio::sync::RwLock`,
///   used when no database is configured and by the test suites
///
/// Both report integrity failures with the PostgreSQL constraint names, so
/// [`StoreError`] converts into the same domain error either way.
///
/// # Cascades
///
/// Deleting a task or an account goes through an explicit cascade routine
/// that removes dependents first and reports what it removed. Nothing relies
/// on implicit ORM behavior.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::error::StoreError;
use crate::models::account::{Account, AccountId, CreateAccount};
use crate::models::comment::{Comment, CommentId, CreateComment};
use crate::models::task::{CreateTask, Task, TaskId};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// The three dashboard collections, read from one consistent view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Viewer's tasks, insertion order
    pub own_tasks: Vec<Task>,

    /// Tasks of accounts the viewer follows, each at most once
    pub followed_tasks: Vec<Task>,

    /// Accounts that are neither the viewer nor followed, by username
    pub suggested_accounts: Vec<Account>,
}

/// Storage operations used by the services
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Connectivity check
    async fn ping(&self) -> StoreResult<()>;

    // Accounts

    async fn create_account(&self, data: CreateAccount) -> StoreResult<Account>;

    async fn find_account(&self, id: AccountId) -> StoreResult<Option<Account>>;

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    /// Exact match; callers lowercase the address first
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Returns false when the account does not exist
    async fn update_password_hash(&self, id: AccountId, password_hash: &str) -> StoreResult<bool>;

    /// Removes the account and everything hanging off it in one unit
    ///
    /// Tasks and their comments, comments the account wrote (with their reply
    /// subtrees), and follow edges in both directions. Returns false when the
    /// account does not exist.
    async fn delete_account_cascade(&self, id: AccountId) -> StoreResult<bool>;

    // Tasks

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    async fn update_task_content(&self, id: TaskId, content: &str) -> StoreResult<Option<Task>>;

    async fn list_tasks_by_owner(&self, owner_id: AccountId) -> StoreResult<Vec<Task>>;

    /// Deletes every comment on the task, then the task
    ///
    /// Returns the number of comments removed, or None if the task was
    /// already gone.
    async fn delete_task_cascade(&self, id: TaskId) -> StoreResult<Option<u64>>;

    // Comments

    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment>;

    async fn find_comment(&self, id: CommentId) -> StoreResult<Option<Comment>>;

    async fn list_top_level_comments(&self, task_id: TaskId) -> StoreResult<Vec<Comment>>;

    async fn list_replies(&self, parent_id: CommentId) -> StoreResult<Vec<Comment>>;

    /// Every comment on the task at any depth
    async fn list_comments_by_task(&self, task_id: TaskId) -> StoreResult<Vec<Comment>>;

    // Follows

    /// Returns true when a new edge was written
    async fn insert_follow(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool>;

    /// Returns true when an edge was removed
    async fn delete_follow(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool>;

    async fn follow_exists(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool>;

    async fn list_followees(&self, follower_id: AccountId) -> StoreResult<Vec<Account>>;

    async fn list_followers(&self, followee_id: AccountId) -> StoreResult<Vec<Account>>;

    // Dashboard

    /// Reads own, followed and suggested in one snapshot
    ///
    /// Returns None when the viewer does not exist.
    async fn dashboard_snapshot(&self, viewer: AccountId) -> StoreResult<Option<DashboardSnapshot>>;
}
