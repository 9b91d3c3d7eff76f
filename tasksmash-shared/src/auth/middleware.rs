/// Session authentication for Axum
///
/// Extracts the session token from `Authorization: Bearer <token>`, validates
/// it and produces the request-scoped [`AuthContext`]. The API installs this
/// as one gate in front of every non-public route, so handlers receive the
/// acting account explicitly instead of reading ambient session state.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use tasksmash_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Account: {}", auth.account_id)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_session_token, Claims, JwtError};
use crate::models::account::AccountId;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Account the session belongs to
    pub account_id: AccountId,
}

impl AuthContext {
    /// Creates auth context from validated session claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            account_id: claims.sub,
        }
    }
}

/// Error type for session authentication
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        let body = Json(serde_json::json!({
            "error": if status == StatusCode::BAD_REQUEST { "bad_request" } else { "unauthorized" },
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Reads the bearer token out of request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Validates the session token carried by a request
///
/// # Errors
///
/// - `MissingCredentials` without an Authorization header
/// - `InvalidFormat` for non-bearer schemes
/// - `InvalidToken` for bad signatures, expiry, or non-session tokens
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_session_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Session expired".to_string()),
        JwtError::UnexpectedType { .. } => {
            AuthError::InvalidToken("Not a session token".to_string())
        }
        _ => AuthError::InvalidToken("Invalid session token".to_string()),
    })?;

    Ok(AuthContext::from_claims(&claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_valid_session() {
        let token = create_token(&Claims::new(11, TokenType::Session), SECRET).unwrap();
        let context = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap();

        assert_eq!(context.account_id, 11);
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            authenticate(&HeaderMap::new(), SECRET),
            Err(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn test_wrong_scheme() {
        assert!(matches!(
            authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_reset_token_is_not_a_session() {
        let token = create_token(&Claims::new(11, TokenType::PasswordReset), SECRET).unwrap();

        assert_eq!(
            authenticate(&headers_with(&format!("Bearer {}", token)), SECRET),
            Err(AuthError::InvalidToken("Not a session token".to_string()))
        );
    }

    #[test]
    fn test_expired_session() {
        let claims = Claims::with_expiration(11, TokenType::Session, Duration::seconds(-10));
        let token = create_token(&claims, SECRET).unwrap();

        assert_eq!(
            authenticate(&headers_with(&format!("Bearer {}", token)), SECRET),
            Err(AuthError::InvalidToken("Session expired".to_string()))
        );
    }

    #[test]
    fn test_auth_error_into_response() {
        assert_eq!(
            AuthError::MissingCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidFormat("bad".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
