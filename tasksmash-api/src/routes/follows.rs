/// Follow graph endpoints
///
/// # Endpoints
///
/// - `GET /v1/follows` - Accounts the signed-in account follows
/// - `GET /v1/followers` - Accounts following the signed-in account
/// - `POST /v1/follows/:account_id` - Follow
/// - `DELETE /v1/follows/:account_id` - Unfollow
///
/// Repeated follows and unfollows succeed and report what happened.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tasksmash_shared::auth::middleware::AuthContext;
use tasksmash_shared::models::account::{Account, AccountId, AccountSummary};
use tasksmash_shared::models::follow::{FollowOutcome, UnfollowOutcome};

/// Follow result
#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub account_id: AccountId,
    pub outcome: FollowOutcome,
}

/// Unfollow result
#[derive(Debug, Serialize, Deserialize)]
pub struct UnfollowResponse {
    pub account_id: AccountId,
    pub outcome: UnfollowOutcome,
}

fn summaries(accounts: Vec<Account>) -> Vec<AccountSummary> {
    accounts.iter().map(AccountSummary::from).collect()
}

pub async fn list_following(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<AccountSummary>>> {
    let accounts = state.services.accounts.list_following(auth.account_id).await?;
    Ok(Json(summaries(accounts)))
}

pub async fn list_followers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<AccountSummary>>> {
    let accounts = state.services.accounts.list_followers(auth.account_id).await?;
    Ok(Json(summaries(accounts)))
}

/// # Errors
///
/// - `404 Not Found`: no such account
/// - `422 Unprocessable Entity`: following yourself
pub async fn follow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(account_id): Path<AccountId>,
) -> ApiResult<Json<FollowResponse>> {
    let outcome = state.services.social.follow(auth.account_id, account_id).await?;

    Ok(Json(FollowResponse { account_id, outcome }))
}

pub async fn unfollow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(account_id): Path<AccountId>,
) -> ApiResult<Json<UnfollowResponse>> {
    let outcome = state.services.social.unfollow(auth.account_id, account_id).await?;

    Ok(Json(UnfollowResponse { account_id, outcome }))
}
