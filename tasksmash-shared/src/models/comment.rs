/// Comment model, database operations and the in-memory thread index
///
/// Comments attach to a task and optionally reply to another comment on the
/// same task. Replies form trees rooted at top-level comments (no parent).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id BIGSERIAL PRIMARY KEY,
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     parent_id BIGINT,
///     content VARCHAR(500) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT comments_task_id_id_key UNIQUE (task_id, id),
///     CONSTRAINT comments_parent_fkey FOREIGN KEY (task_id, parent_id)
///         REFERENCES comments (task_id, id) ON DELETE CASCADE
/// );
/// ```
///
/// The composite parent key makes "the parent lives on the same task" a
/// database invariant, not just an application check.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::account::AccountId;
use super::task::TaskId;

/// Comment identifier
pub type CommentId = i64;

/// A comment or reply on a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Store-assigned identifier
    pub id: CommentId,

    /// Task the comment belongs to
    pub task_id: TaskId,

    /// Account that wrote it
    pub author_id: AccountId,

    /// Comment this one replies to (None for top-level)
    pub parent_id: Option<CommentId>,

    /// Comment text (1-500 characters)
    pub content: String,

    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// True when the comment has no parent
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub task_id: TaskId,
    pub author_id: AccountId,
    pub parent_id: Option<CommentId>,
    pub content: String,
}

impl Comment {
    /// Inserts a comment
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation when the task is gone or when the
    /// parent is not a comment on the same task.
    pub async fn create<'e, E>(executor: E, data: CreateComment) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, author_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, task_id, author_id, parent_id, content, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(data.parent_id)
        .bind(data.content)
        .fetch_one(executor)
        .await
    }

    /// Finds a comment by ID
    pub async fn find_by_id<'e, E>(executor: E, id: CommentId) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, parent_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists comments on a task that have no parent, oldest first
    pub async fn list_top_level<'e, E>(executor: E, task_id: TaskId) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, parent_id, content, created_at
            FROM comments
            WHERE task_id = $1 AND parent_id IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }

    /// Lists direct replies to a comment, oldest first
    pub async fn list_replies<'e, E>(executor: E, parent_id: CommentId) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, parent_id, content, created_at
            FROM comments
            WHERE parent_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(executor)
        .await
    }

    /// Lists every comment on a task at any depth, oldest first
    pub async fn list_by_task<'e, E>(executor: E, task_id: TaskId) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, parent_id, content, created_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }

    /// Deletes every comment on a task, returning the count
    pub async fn delete_by_task<'e, E>(executor: E, task_id: TaskId) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(task_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every comment on tasks owned by an account
    pub async fn delete_by_task_owner<'e, E>(
        executor: E,
        owner_id: AccountId,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE task_id IN (SELECT id FROM tasks WHERE owner_id = $1)
            "#,
        )
        .bind(owner_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every comment written by an account
    ///
    /// Replies by other accounts underneath go with them through the
    /// `comments_parent_fkey` cascade.
    pub async fn delete_by_author<'e, E>(
        executor: E,
        author_id: AccountId,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM comments WHERE author_id = $1")
            .bind(author_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

/// One line of a materialized discussion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadEntry {
    /// Nesting level, 0 for top-level comments
    pub depth: usize,

    #[serde(flatten)]
    pub comment: Comment,
}

/// Parent-to-children index over the comments of one task
///
/// Built once from a flat list, then walked without recursion so a very deep
/// reply chain cannot exhaust the call stack.
#[derive(Debug, Default)]
pub struct CommentTree {
    comments: HashMap<CommentId, Comment>,
    roots: Vec<CommentId>,
    children: HashMap<CommentId, Vec<CommentId>>,
}

impl CommentTree {
    /// Builds the index
    ///
    /// Siblings keep creation order (ties broken by id). A comment whose
    /// parent is missing from the input is treated as a root so that nothing
    /// silently disappears from the thread.
    pub fn from_comments(mut comments: Vec<Comment>) -> Self {
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let known: std::collections::HashSet<CommentId> = comments.iter().map(|c| c.id).collect();
        let mut tree = CommentTree::default();

        for comment in comments {
            match comment.parent_id {
                Some(parent) if known.contains(&parent) => {
                    tree.children.entry(parent).or_default().push(comment.id);
                }
                _ => tree.roots.push(comment.id),
            }
            tree.comments.insert(comment.id, comment);
        }

        tree
    }

    /// Number of comments in the tree
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// True if the task has no comments
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Top-level comments in creation order
    pub fn roots(&self) -> impl Iterator<Item = &Comment> {
        self.roots.iter().filter_map(|id| self.comments.get(id))
    }

    /// Direct replies to `id` in creation order
    pub fn replies(&self, id: CommentId) -> impl Iterator<Item = &Comment> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.comments.get(child))
    }

    /// Depth-first, pre-order listing of the whole discussion
    pub fn walk_depth_first(&self) -> Vec<ThreadEntry> {
        let mut entries = Vec::with_capacity(self.comments.len());
        // Reversed pushes so the oldest sibling is popped first
        let mut stack: Vec<(CommentId, usize)> =
            self.roots.iter().rev().map(|id| (*id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(comment) = self.comments.get(&id) else {
                continue;
            };
            entries.push(ThreadEntry {
                depth,
                comment: comment.clone(),
            });
            if let Some(children) = self.children.get(&id) {
                stack.extend(children.iter().rev().map(|child| (*child, depth + 1)));
            }
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn comment(id: CommentId, parent_id: Option<CommentId>, minute: i64) -> Comment {
        let base = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Comment {
            id,
            task_id: 1,
            author_id: 1,
            parent_id,
            content: format!("comment {}", id),
            created_at: base + Duration::minutes(minute),
        }
    }

    #[test]
    fn test_walk_is_preorder_with_sibling_order() {
        // 1
        // ├── 3
        // │   └── 5
        // └── 4
        // 2
        let tree = CommentTree::from_comments(vec![
            comment(5, Some(3), 4),
            comment(2, None, 1),
            comment(4, Some(1), 3),
            comment(1, None, 0),
            comment(3, Some(1), 2),
        ]);

        let order: Vec<(CommentId, usize)> = tree
            .walk_depth_first()
            .into_iter()
            .map(|e| (e.comment.id, e.depth))
            .collect();

        assert_eq!(order, vec![(1, 0), (3, 1), (5, 2), (4, 1), (2, 0)]);
    }

    #[test]
    fn test_roots_and_replies() {
        let tree = CommentTree::from_comments(vec![
            comment(1, None, 0),
            comment(2, Some(1), 1),
            comment(3, Some(1), 2),
        ]);

        let roots: Vec<CommentId> = tree.roots().map(|c| c.id).collect();
        assert_eq!(roots, vec![1]);

        let replies: Vec<CommentId> = tree.replies(1).map(|c| c.id).collect();
        assert_eq!(replies, vec![2, 3]);
        assert_eq!(tree.replies(2).count(), 0);
    }

    #[test]
    fn test_same_timestamp_breaks_ties_by_id() {
        let tree = CommentTree::from_comments(vec![comment(9, None, 0), comment(8, None, 0)]);
        let roots: Vec<CommentId> = tree.roots().map(|c| c.id).collect();
        assert_eq!(roots, vec![8, 9]);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let tree = CommentTree::from_comments(vec![comment(2, Some(99), 0)]);
        assert_eq!(tree.roots().count(), 1);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let comments: Vec<Comment> = (1..=10_000)
            .map(|id| comment(id, if id == 1 { None } else { Some(id - 1) }, id))
            .collect();

        let tree = CommentTree::from_comments(comments);
        let entries = tree.walk_depth_first();

        assert_eq!(entries.len(), 10_000);
        assert_eq!(entries.last().unwrap().depth, 9_999);
    }

    #[test]
    fn test_empty_tree() {
        let tree = CommentTree::from_comments(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.walk_depth_first().is_empty());
    }
}
