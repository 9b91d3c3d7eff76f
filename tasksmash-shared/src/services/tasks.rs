/// Task lifecycle: create, view, edit, delete
///
/// Any authenticated account may view any task. Only the owner may edit or
/// delete it.

use std::sync::Arc;

use serde::Serialize;

use super::validation;
use crate::error::{CoreError, CoreResult};
use crate::models::account::AccountId;
use crate::models::comment::{CommentTree, ThreadEntry};
use crate::models::task::{CreateTask, Task, TaskId};
use crate::store::Store;

/// A task with its owner's name and the whole discussion
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub task: Task,
    pub owner_username: String,
    pub thread: Vec<ThreadEntry>,
}

/// What a task deletion removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedTask {
    pub task_id: TaskId,
    pub comments_removed: u64,
}

/// Task operations
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        TaskService { store }
    }

    /// Creates a task owned by `owner_id`
    pub async fn create_task(&self, owner_id: AccountId, content: &str) -> CoreResult<Task> {
        let content = validation::task_content(content)?;
        let task = self.store.create_task(CreateTask { owner_id, content }).await?;

        tracing::info!(account_id = owner_id, task_id = task.id, "Task created");
        Ok(task)
    }

    async fn find(&self, task_id: TaskId) -> CoreResult<Task> {
        self.store
            .find_task(task_id)
            .await?
            .ok_or(CoreError::NotFound("Task"))
    }

    async fn find_owned(&self, actor: AccountId, task_id: TaskId) -> CoreResult<Task> {
        let task = self.find(task_id).await?;

        if task.owner_id != actor {
            tracing::warn!(account_id = actor, task_id, "Rejected change to another account's task");
            return Err(CoreError::Forbidden("Only the owner can change this task".to_string()));
        }

        Ok(task)
    }

    /// Loads a task with its owner and threaded comments
    pub async fn get_task(&self, task_id: TaskId) -> CoreResult<TaskView> {
        let task = self.find(task_id).await?;

        let owner_username = self
            .store
            .find_account(task.owner_id)
            .await?
            .map(|owner| owner.username)
            .ok_or(CoreError::NotFound("Account"))?;

        let comments = self.store.list_comments_by_task(task_id).await?;
        let thread = CommentTree::from_comments(comments).walk_depth_first();

        Ok(TaskView {
            task,
            owner_username,
            thread,
        })
    }

    /// Tasks owned by `owner_id`, insertion order
    pub async fn list_own(&self, owner_id: AccountId) -> CoreResult<Vec<Task>> {
        Ok(self.store.list_tasks_by_owner(owner_id).await?)
    }

    /// Replaces the content of a task the actor owns
    pub async fn edit_task(&self, actor: AccountId, task_id: TaskId, content: &str) -> CoreResult<Task> {
        let content = validation::task_content(content)?;
        self.find_owned(actor, task_id).await?;

        let task = self
            .store
            .update_task_content(task_id, &content)
            .await?
            .ok_or(CoreError::NotFound("Task"))?;

        tracing::info!(account_id = actor, task_id, "Task edited");
        Ok(task)
    }

    /// Deletes a task the actor owns together with all of its comments
    pub async fn delete_task(&self, actor: AccountId, task_id: TaskId) -> CoreResult<DeletedTask> {
        self.find_owned(actor, task_id).await?;

        let comments_removed = self
            .store
            .delete_task_cascade(task_id)
            .await?
            .ok_or(CoreError::NotFound("Task"))?;

        tracing::info!(account_id = actor, task_id, comments_removed, "Task deleted");
        Ok(DeletedTask {
            task_id,
            comments_removed,
        })
    }
}
