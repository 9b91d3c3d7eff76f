/// Threaded comments
///
/// Comments are immutable once posted and only disappear with their task
/// (or with their author's account).

use std::sync::Arc;

use super::validation;
use crate::error::{CoreError, CoreResult};
use crate::models::account::AccountId;
use crate::models::comment::{Comment, CommentId, CommentTree, CreateComment, ThreadEntry};
use crate::models::task::TaskId;
use crate::store::Store;

/// Comment operations
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        CommentService { store }
    }

    async fn require_task(&self, task_id: TaskId) -> CoreResult<()> {
        match self.store.find_task(task_id).await? {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound("Task")),
        }
    }

    /// Posts a comment, or a reply when `parent_id` is set
    ///
    /// # Errors
    ///
    /// - `Validation` for empty or oversized content
    /// - `NotFound("Task")` when the task does not exist
    /// - `NotFound("Parent comment")` when the parent is missing or belongs
    ///   to a different task
    pub async fn add_comment(
        &self,
        task_id: TaskId,
        author_id: AccountId,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> CoreResult<Comment> {
        let content = validation::comment_content(content)?;
        self.require_task(task_id).await?;

        if let Some(parent_id) = parent_id {
            let parent = self.store.find_comment(parent_id).await?;
            if !parent.is_some_and(|p| p.task_id == task_id) {
                tracing::warn!(task_id, parent_id, "Reply rejected: parent not on this task");
                return Err(CoreError::NotFound("Parent comment"));
            }
        }

        let comment = self
            .store
            .create_comment(CreateComment {
                task_id,
                author_id,
                parent_id,
                content,
            })
            .await?;

        tracing::info!(
            account_id = author_id,
            task_id,
            comment_id = comment.id,
            parent_id = ?parent_id,
            "Comment added"
        );
        Ok(comment)
    }

    /// Comments on the task without a parent, oldest first
    pub async fn list_top_level(&self, task_id: TaskId) -> CoreResult<Vec<Comment>> {
        self.require_task(task_id).await?;
        Ok(self.store.list_top_level_comments(task_id).await?)
    }

    /// Direct replies to a comment, oldest first
    pub async fn list_replies(&self, comment_id: CommentId) -> CoreResult<Vec<Comment>> {
        if self.store.find_comment(comment_id).await?.is_none() {
            return Err(CoreError::NotFound("Comment"));
        }
        Ok(self.store.list_replies(comment_id).await?)
    }

    /// The whole discussion, depth-first with nesting levels
    pub async fn thread(&self, task_id: TaskId) -> CoreResult<Vec<ThreadEntry>> {
        self.require_task(task_id).await?;
        let comments = self.store.list_comments_by_task(task_id).await?;
        Ok(CommentTree::from_comments(comments).walk_depth_first())
    }
}
