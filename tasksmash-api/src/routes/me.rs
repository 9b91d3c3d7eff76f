/// The signed-in account
///
/// - `GET /v1/me`
/// - `PUT /v1/me/password`

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tasksmash_shared::auth::middleware::AuthContext;
use tasksmash_shared::models::account::Account;
use validator::Validate;

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 1, max = 128, message = "Password must be between 1 and 128 characters"))]
    pub new_password: String,
}

pub async fn current_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Account>> {
    Ok(Json(state.services.accounts.get(auth.account_id).await?))
}

/// Change password; requires the current one
///
/// Answers 204 on success, 401 when the current password is wrong.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .services
        .accounts
        .change_password(auth.account_id, &req.current_password, &req.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
