/// Password reset endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/password-reset` - Mail a reset link
/// - `GET /v1/auth/password-reset/:token` - Check a reset link
/// - `POST /v1/auth/password-reset/:token` - Set a new password
///
/// The request endpoint answers 202 with the same body whether or not the
/// email is registered.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasksmash_shared::error::CoreError;
use validator::Validate;

/// Generic answer to reset requests
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists for that email, a password reset link has been sent";

/// Reset link request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

impl ResetRequest {
    /// Strips surrounding whitespace before validation
    fn trimmed(mut self) -> Self {
        self.email = self.email.trim().to_string();
        self
    }
}

/// New password submitted through a reset link
#[derive(Debug, Deserialize, Validate)]
pub struct ResetConfirmRequest {
    #[validate(length(min = 1, max = 128, message = "Password must be between 1 and 128 characters"))]
    pub new_password: String,
}

/// Plain message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Reset link status
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetStatusResponse {
    pub valid: bool,
    pub expires_at: DateTime<Utc>,
}

/// Request a reset link
///
/// Unknown emails and mail hand-off failures are logged, never reported.
pub async fn request_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let req = req.trimmed();
    req.validate()?;

    match state.services.password_reset.issue_token(&req.email).await {
        Ok(_) => {}
        Err(CoreError::NotFound(_)) => {
            tracing::info!("Password reset requested for unknown email");
        }
        Err(CoreError::Delivery(e)) => {
            tracing::warn!(error = %e, "Password reset mail could not be queued");
        }
        Err(e) => return Err(e.into()),
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: RESET_REQUESTED_MESSAGE.to_string(),
        }),
    ))
}

/// Check a reset link without using it
///
/// # Errors
///
/// - `400 Bad Request`: malformed, tampered or non-reset token
/// - `410 Gone`: expired link
pub async fn verify_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<ResetStatusResponse>> {
    let claims = state.services.password_reset.verify_token(&token)?;

    Ok(Json(ResetStatusResponse {
        valid: true,
        expires_at: claims.expires_at,
    }))
}

/// Set a new password through a reset link
///
/// # Errors
///
/// - `400 Bad Request`: malformed, tampered or non-reset token
/// - `410 Gone`: expired link
/// - `422 Unprocessable Entity`: new password rejected
pub async fn confirm_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetConfirmRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    state
        .services
        .password_reset
        .consume_token(&token, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Your password has been updated".to_string(),
    }))
}
