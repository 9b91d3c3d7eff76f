/// PostgreSQL store
///
/// Thin adapter from [`Store`] to the model functions. Multi-statement work
/// (cascades, the dashboard snapshot) runs in a single transaction.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{DashboardSnapshot, Store, StoreResult};
use crate::models::account::{Account, AccountId, CreateAccount};
use crate::models::comment::{Comment, CommentId, CreateComment};
use crate::models::follow::Follow;
use crate::models::task::{CreateTask, Task, TaskId};

/// Store backed by a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    /// Borrow the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_account(&self, data: CreateAccount) -> StoreResult<Account> {
        Ok(Account::create(&self.pool, data).await?)
    }

    async fn find_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(Account::find_by_id(&self.pool, id).await?)
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(Account::find_by_username(&self.pool, username).await?)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(Account::find_by_email(&self.pool, email).await?)
    }

    async fn update_password_hash(&self, id: AccountId, password_hash: &str) -> StoreResult<bool> {
        Ok(Account::update_password_hash(&self.pool, id, password_hash).await?)
    }

    async fn delete_account_cascade(&self, id: AccountId) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let on_own_tasks = Comment::delete_by_task_owner(&mut *tx, id).await?;
        let tasks = Task::delete_by_owner(&mut *tx, id).await?;
        let authored = Comment::delete_by_author(&mut *tx, id).await?;
        let edges = Follow::delete_for_account(&mut *tx, id).await?;
        let deleted = Account::delete(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::debug!(
            account_id = id,
            tasks,
            comments = on_own_tasks + authored,
            edges,
            deleted,
            "Account cascade committed"
        );

        Ok(deleted)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn update_task_content(&self, id: TaskId, content: &str) -> StoreResult<Option<Task>> {
        Ok(Task::update_content(&self.pool, id, content).await?)
    }

    async fn list_tasks_by_owner(&self, owner_id: AccountId) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn delete_task_cascade(&self, id: TaskId) -> StoreResult<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<(TaskId,)> =
            sqlx::query_as("SELECT id FROM tasks WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let comments = Comment::delete_by_task(&mut *tx, id).await?;
        Task::delete(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::debug!(task_id = id, comments, "Task cascade committed");
        Ok(Some(comments))
    }

    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        Ok(Comment::create(&self.pool, data).await?)
    }

    async fn find_comment(&self, id: CommentId) -> StoreResult<Option<Comment>> {
        Ok(Comment::find_by_id(&self.pool, id).await?)
    }

    async fn list_top_level_comments(&self, task_id: TaskId) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_top_level(&self.pool, task_id).await?)
    }

    async fn list_replies(&self, parent_id: CommentId) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_replies(&self.pool, parent_id).await?)
    }

    async fn list_comments_by_task(&self, task_id: TaskId) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_by_task(&self.pool, task_id).await?)
    }

    async fn insert_follow(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool> {
        Ok(Follow::insert(&self.pool, follower_id, followee_id).await?)
    }

    async fn delete_follow(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool> {
        Ok(Follow::delete(&self.pool, follower_id, followee_id).await?)
    }

    async fn follow_exists(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool> {
        Ok(Follow::exists(&self.pool, follower_id, followee_id).await?)
    }

    async fn list_followees(&self, follower_id: AccountId) -> StoreResult<Vec<Account>> {
        Ok(Follow::list_followees(&self.pool, follower_id).await?)
    }

    async fn list_followers(&self, followee_id: AccountId) -> StoreResult<Vec<Account>> {
        Ok(Follow::list_followers(&self.pool, followee_id).await?)
    }

    async fn dashboard_snapshot(&self, viewer: AccountId) -> StoreResult<Option<DashboardSnapshot>> {
        let mut tx = self.pool.begin().await?;

        // Must be the first statement of the transaction
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        if Account::find_by_id(&mut *tx, viewer).await?.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let own_tasks = Task::list_by_owner(&mut *tx, viewer).await?;
        let followed_tasks = Task::list_followed(&mut *tx, viewer).await?;
        let suggested_accounts = Account::list_suggested(&mut *tx, viewer).await?;

        tx.commit().await?;

        Ok(Some(DashboardSnapshot {
            own_tasks,
            followed_tasks,
            suggested_accounts,
        }))
    }
}
