/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register and open a session
/// - `POST /v1/auth/login` - Login and get a session token

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasksmash_shared::models::account::Account;
use tasksmash_shared::services::accounts::SessionGrant;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username, 4-50 characters
    #[validate(length(min = 4, max = 50, message = "Username must be between 4 and 50 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, max = 128, message = "Password must be between 1 and 128 characters"))]
    pub password: String,
}

impl RegisterRequest {
    /// Strips surrounding whitespace before validation
    fn trimmed(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Session response (register and login)
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The signed-in account
    pub account: Account,

    /// Bearer session token
    pub token: String,

    /// Token expiry
    pub expires_at: DateTime<Utc>,
}

impl From<SessionGrant> for SessionResponse {
    fn from(grant: SessionGrant) -> Self {
        SessionResponse {
            account: grant.account,
            token: grant.token,
            expires_at: grant.expires_at,
        }
    }
}

/// Register a new account
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// { "username": "alice", "email": "alice@example.com", "password": "pw123" }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: username or email already taken
/// - `422 Unprocessable Entity`: validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let req = req.trimmed();
    req.validate()?;

    let accounts = &state.services.accounts;
    let account = accounts.register(&req.username, &req.email, &req.password).await?;
    let grant = accounts.issue_session(account)?;

    Ok((StatusCode::CREATED, Json(grant.into())))
}

/// Login with username and password
///
/// # Errors
///
/// - `401 Unauthorized`: unknown username or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()?;

    let grant = state
        .services
        .accounts
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(Json(grant.into()))
}
