/// In-memory store
///
/// All state lives behind one `RwLock`. Writers take the write lock for the
/// whole operation, so every method is atomic, and the dashboard reads its
/// three collections under a single read guard.
///
/// Integrity rules match the PostgreSQL schema and are reported with the same
/// constraint names.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{DashboardSnapshot, Store, StoreError, StoreResult};
use crate::models::account::{Account, AccountId, CreateAccount};
use crate::models::comment::{Comment, CommentId, CreateComment};
use crate::models::follow::Follow;
use crate::models::task::{CreateTask, Task, TaskId};

#[derive(Debug, Default)]
struct State {
    next_account_id: AccountId,
    next_task_id: TaskId,
    next_comment_id: CommentId,
    // Keyed by id, so iteration is insertion order
    accounts: BTreeMap<AccountId, Account>,
    tasks: BTreeMap<TaskId, Task>,
    comments: BTreeMap<CommentId, Comment>,
    follows: BTreeMap<(AccountId, AccountId), Follow>,
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

fn foreign_key(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation {
        constraint: constraint.to_string(),
    }
}

fn by_username(mut accounts: Vec<Account>) -> Vec<Account> {
    accounts.sort_by(|a, b| a.username.cmp(&b.username));
    accounts
}

impl State {
    fn followees(&self, follower_id: AccountId) -> impl Iterator<Item = AccountId> + '_ {
        self.follows
            .range((follower_id, AccountId::MIN)..=(follower_id, AccountId::MAX))
            .map(|((_, followee), _)| *followee)
    }

    /// Removes the listed comments and every reply below them
    fn remove_comment_subtrees(&mut self, roots: Vec<CommentId>) -> u64 {
        let mut doomed: HashSet<CommentId> = HashSet::new();
        let mut stack = roots;

        while let Some(id) = stack.pop() {
            if !doomed.insert(id) {
                continue;
            }
            stack.extend(
                self.comments
                    .values()
                    .filter(|c| c.parent_id == Some(id))
                    .map(|c| c.id),
            );
        }

        let before = self.comments.len();
        self.comments.retain(|id, _| !doomed.contains(id));
        (before - self.comments.len()) as u64
    }

    fn delete_task(&mut self, id: TaskId) -> Option<u64> {
        self.tasks.remove(&id)?;
        let before = self.comments.len();
        self.comments.retain(|_, c| c.task_id != id);
        Some((before - self.comments.len()) as u64)
    }
}

/// Store kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_account(&self, data: CreateAccount) -> StoreResult<Account> {
        let mut state = self.state.write().await;

        if state.accounts.values().any(|a| a.username == data.username) {
            return Err(unique("accounts_username_key"));
        }
        if state.accounts.values().any(|a| a.email == data.email) {
            return Err(unique("accounts_email_key"));
        }

        state.next_account_id += 1;
        let now = Utc::now();
        let account = Account {
            id: state.next_account_id,
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().find(|a| a.username == username).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn update_password_hash(&self, id: AccountId, password_hash: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        match state.accounts.get_mut(&id) {
            Some(account) => {
                account.password_hash = password_hash.to_string();
                account.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_account_cascade(&self, id: AccountId) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        if !state.accounts.contains_key(&id) {
            return Ok(false);
        }

        let owned: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|t| t.owner_id == id)
            .map(|t| t.id)
            .collect();
        for task_id in owned {
            state.delete_task(task_id);
        }

        let authored: Vec<CommentId> = state
            .comments
            .values()
            .filter(|c| c.author_id == id)
            .map(|c| c.id)
            .collect();
        state.remove_comment_subtrees(authored);

        state
            .follows
            .retain(|(follower, followee), _| *follower != id && *followee != id);
        state.accounts.remove(&id);

        Ok(true)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut state = self.state.write().await;

        if !state.accounts.contains_key(&data.owner_id) {
            return Err(foreign_key("tasks_owner_id_fkey"));
        }

        state.next_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: state.next_task_id,
            owner_id: data.owner_id,
            content: data.content,
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.state.read().await.tasks.get(&id).cloned())
    }

    async fn update_task_content(&self, id: TaskId, content: &str) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        Ok(state.tasks.get_mut(&id).map(|task| {
            task.content = content.to_string();
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn list_tasks_by_owner(&self, owner_id: AccountId) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn delete_task_cascade(&self, id: TaskId) -> StoreResult<Option<u64>> {
        Ok(self.state.write().await.delete_task(id))
    }

    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        let mut state = self.state.write().await;

        if !state.tasks.contains_key(&data.task_id) {
            return Err(foreign_key("comments_task_id_fkey"));
        }
        if !state.accounts.contains_key(&data.author_id) {
            return Err(foreign_key("comments_author_id_fkey"));
        }
        if let Some(parent_id) = data.parent_id {
            let same_task = state
                .comments
                .get(&parent_id)
                .is_some_and(|parent| parent.task_id == data.task_id);
            if !same_task {
                return Err(foreign_key("comments_parent_fkey"));
            }
        }

        state.next_comment_id += 1;
        let comment = Comment {
            id: state.next_comment_id,
            task_id: data.task_id,
            author_id: data.author_id,
            parent_id: data.parent_id,
            content: data.content,
            created_at: Utc::now(),
        };
        state.comments.insert(comment.id, comment.clone());

        Ok(comment)
    }

    async fn find_comment(&self, id: CommentId) -> StoreResult<Option<Comment>> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_top_level_comments(&self, task_id: TaskId) -> StoreResult<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .values()
            .filter(|c| c.task_id == task_id && c.is_top_level())
            .cloned()
            .collect())
    }

    async fn list_replies(&self, parent_id: CommentId) -> StoreResult<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn list_comments_by_task(&self, task_id: TaskId) -> StoreResult<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn insert_follow(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        if follower_id == followee_id {
            return Err(StoreError::CheckViolation {
                constraint: "follows_no_self_follow".to_string(),
            });
        }
        if !state.accounts.contains_key(&follower_id) {
            return Err(foreign_key("follows_follower_id_fkey"));
        }
        if !state.accounts.contains_key(&followee_id) {
            return Err(foreign_key("follows_followee_id_fkey"));
        }

        if state.follows.contains_key(&(follower_id, followee_id)) {
            return Ok(false);
        }

        state.follows.insert(
            (follower_id, followee_id),
            Follow {
                follower_id,
                followee_id,
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn delete_follow(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.follows.remove(&(follower_id, followee_id)).is_some())
    }

    async fn follow_exists(&self, follower_id: AccountId, followee_id: AccountId) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state.follows.contains_key(&(follower_id, followee_id)))
    }

    async fn list_followees(&self, follower_id: AccountId) -> StoreResult<Vec<Account>> {
        let state = self.state.read().await;
        let accounts = state
            .followees(follower_id)
            .filter_map(|id| state.accounts.get(&id).cloned())
            .collect();
        Ok(by_username(accounts))
    }

    async fn list_followers(&self, followee_id: AccountId) -> StoreResult<Vec<Account>> {
        let state = self.state.read().await;
        let accounts = state
            .follows
            .keys()
            .filter(|(_, followee)| *followee == followee_id)
            .filter_map(|(follower, _)| state.accounts.get(follower).cloned())
            .collect();
        Ok(by_username(accounts))
    }

    async fn dashboard_snapshot(&self, viewer: AccountId) -> StoreResult<Option<DashboardSnapshot>> {
        let state = self.state.read().await;

        if !state.accounts.contains_key(&viewer) {
            return Ok(None);
        }

        let followed: BTreeSet<AccountId> =
            state.followees(viewer).filter(|id| *id != viewer).collect();

        let own_tasks = state
            .tasks
            .values()
            .filter(|t| t.owner_id == viewer)
            .cloned()
            .collect();

        let followed_tasks = state
            .tasks
            .values()
            .filter(|t| followed.contains(&t.owner_id))
            .cloned()
            .collect();

        let suggested_accounts = by_username(
            state
                .accounts
                .values()
                .filter(|a| a.id != viewer && !followed.contains(&a.id))
                .cloned()
                .collect(),
        );

        Ok(Some(DashboardSnapshot {
            own_tasks,
            followed_tasks,
            suggested_accounts,
        }))
    }
}
