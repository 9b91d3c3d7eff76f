/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/tasks` - Tasks of the signed-in account
/// - `POST /v1/tasks` - Create a task
/// - `GET /v1/tasks/:id` - Task with owner and comment thread
/// - `PUT /v1/tasks/:id` - Edit (owner only)
/// - `DELETE /v1/tasks/:id` - Delete with all comments (owner only)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasksmash_shared::auth::middleware::AuthContext;
use tasksmash_shared::models::task::{Task, TaskId};
use tasksmash_shared::services::tasks::{DeletedTask, TaskView};
use validator::Validate;

/// Task body for create and edit
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    #[validate(length(min = 1, max = 200, message = "Content must be between 1 and 200 characters"))]
    pub content: String,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.services.tasks.list_own(auth.account_id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = state
        .services
        .tasks
        .create_task(auth.account_id, &req.content)
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Any signed-in account may view any task
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(state.services.tasks.get_task(id).await?))
}

/// # Errors
///
/// - `403 Forbidden`: not the owner
/// - `404 Not Found`: no such task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<TaskId>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = state
        .services
        .tasks
        .edit_task(auth.account_id, id, &req.content)
        .await?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<DeletedTask>> {
    Ok(Json(state.services.tasks.delete_task(auth.account_id, id).await?))
}
