/// Signed token generation and validation
///
/// Both session tokens and password reset tokens are JWTs signed with HS256
/// and share one claims shape; `token_type` keeps one kind from being
/// accepted where the other is expected.
///
/// # Token Types
///
/// - **Session**: 24h by default, sent as `Authorization: Bearer <token>`
/// - **PasswordReset**: 1h by default, embedded in the emailed reset link
///
/// Reset tokens are stateless. Nothing is persisted, so a token stays usable
/// until `exp` even after it has been consumed once.
///
/// # Example
///
/// ```
/// use tasksmash_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(42, TokenType::Session);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::account::AccountId;

/// Value of the `iss` claim
pub const ISSUER: &str = "tasksmash";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature or claim checks failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is not a JWT at all
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Token was issued by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// Token is of the wrong kind for this use
    #[error("Expected {expected} token, got {actual} token")]
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Login session
    Session,

    /// Single password reset link
    PasswordReset,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Session => Duration::hours(24),
            TokenType::PasswordReset => Duration::hours(1),
        }
    }

    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Session => "session",
            TokenType::PasswordReset => "password_reset",
        }
    }
}

/// JWT claims structure
///
/// - `sub`: account id
/// - `iss`: always [`ISSUER`]
/// - `iat` / `nbf`: issue instant (Unix seconds)
/// - `exp`: expiry instant (Unix seconds)
/// - `token_type`: session or password reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: AccountId,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims issued now with the type's default lifetime
    pub fn new(account_id: AccountId, token_type: TokenType) -> Self {
        Self::issued_at(account_id, token_type, Utc::now(), token_type.default_expiration())
    }

    /// Creates claims issued now with a custom lifetime
    pub fn with_expiration(account_id: AccountId, token_type: TokenType, expires_in: Duration) -> Self {
        Self::issued_at(account_id, token_type, Utc::now(), expires_in)
    }

    /// Creates claims issued at an explicit instant
    pub fn issued_at(
        account_id: AccountId,
        token_type: TokenType,
        now: DateTime<Utc>,
        expires_in: Duration,
    ) -> Self {
        let expiration = now + expires_in;

        Self {
            sub: account_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Checks expiry against an explicit instant (`now >= exp` is expired)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token against the current time
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    validate_token_at(token, secret, Utc::now())
}

/// Validates a token against an explicit instant
///
/// The library's own clock checks are disabled and replaced by a comparison
/// with `now` (no leeway), so expiry is reproducible in tests.
pub fn validate_token_at(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = false;
    validation.validate_nbf = false;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
            JwtError::InvalidFormat(format!("Token could not be decoded: {}", e))
        }
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    let claims = token_data.claims;

    if claims.is_expired_at(now) {
        return Err(JwtError::Expired);
    }

    if now.timestamp() < claims.nbf {
        return Err(JwtError::ValidationError("Token is not valid yet".to_string()));
    }

    Ok(claims)
}

fn expect_type(claims: Claims, expected: TokenType) -> Result<Claims, JwtError> {
    if claims.token_type != expected {
        return Err(JwtError::UnexpectedType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }

    Ok(claims)
}

/// Validates a token and checks it is a session token
pub fn validate_session_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Session)
}

/// Validates a token at `now` and checks it is a password reset token
pub fn validate_reset_token_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<Claims, JwtError> {
    expect_type(validate_token_at(token, secret, now)?, TokenType::PasswordReset)
}
