/// Dashboard endpoint
///
/// `GET /v1/dashboard` returns the viewer's own tasks, the tasks of accounts
/// they follow, and accounts they could follow, from one snapshot.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use tasksmash_shared::auth::middleware::AuthContext;
use tasksmash_shared::services::dashboard::Dashboard;

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.services.dashboard.dashboard(auth.account_id).await?))
}
