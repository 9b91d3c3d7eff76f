/// Comment endpoints
///
/// # Endpoints
///
/// - `GET /v1/tasks/:id/comments` - Top-level comments
/// - `POST /v1/tasks/:id/comments` - Comment, or reply with `parent_id`
/// - `GET /v1/comments/:id/replies` - Direct replies

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasksmash_shared::auth::middleware::AuthContext;
use tasksmash_shared::models::comment::{Comment, CommentId};
use tasksmash_shared::models::task::TaskId;
use validator::Validate;

/// New comment
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 500, message = "Content must be between 1 and 500 characters"))]
    pub content: String,

    /// Comment being replied to; must be on the same task
    #[serde(default)]
    pub parent_id: Option<CommentId>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.services.comments.list_top_level(task_id).await?))
}

/// # Errors
///
/// - `404 Not Found`: no such task, or the parent is not a comment on it
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<TaskId>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;

    let comment = state
        .services
        .comments
        .add_comment(task_id, auth.account_id, &req.content, req.parent_id)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_replies(
    State(state): State<AppState>,
    Path(comment_id): Path<CommentId>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.services.comments.list_replies(comment_id).await?))
}
