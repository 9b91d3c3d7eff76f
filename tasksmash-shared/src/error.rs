/// Domain error types
///
/// Every service operation returns [`CoreResult`]. Store backends report
/// [`StoreError`], which converts into [`CoreError`] so unique-constraint
/// violations surface as conflicts and everything else as an opaque storage
/// failure.
///
/// # Taxonomy
///
/// - `Validation`: empty or malformed input
/// - `NotFound`: referenced entity absent
/// - `Conflict`: unique constraint violated (username, email)
/// - `Unauthorized`: credential check failed
/// - `Forbidden`: actor may not mutate the resource
/// - `TokenExpired` / `TokenInvalid`: password reset tokens
/// - `Delivery`: mail hand-off failed
/// - `Storage` / `Internal`: never shown verbatim to end users

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::mail::MailError;

/// Result alias used by services
pub type CoreResult<T> = Result<T, CoreError>;

/// Domain error returned by services
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed validation
    #[error("Validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Credentials were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Actor is not allowed to touch the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Reset token is past its expiry
    #[error("Token has expired")]
    TokenExpired,

    /// Reset token failed signature or format checks
    #[error("Token is invalid")]
    TokenInvalid,

    /// Mail hand-off failed
    #[error("Mail delivery failed: {0}")]
    Delivery(String),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Anything else (hashing, signing)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure on one field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Error reported by store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key target disappeared
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// A check constraint rejected the write
    #[error("Check constraint violated: {constraint}")]
    CheckViolation { constraint: String },

    /// Any other backend failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            // SQLSTATE class 23: integrity constraint violation
            match db_err.code().as_deref() {
                Some("23505") => return StoreError::UniqueViolation { constraint },
                Some("23503") => return StoreError::ForeignKeyViolation { constraint },
                Some("23514") => return StoreError::CheckViolation { constraint },
                _ => {}
            }
        }

        StoreError::Database(err.to_string())
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                if constraint.contains("username") {
                    CoreError::Conflict("Username already taken".to_string())
                } else if constraint.contains("email") {
                    CoreError::Conflict("Email already registered".to_string())
                } else {
                    CoreError::Conflict(format!("Constraint violation: {}", constraint))
                }
            }
            StoreError::ForeignKeyViolation { constraint } => {
                if constraint.contains("parent") {
                    CoreError::NotFound("Parent comment")
                } else if constraint.starts_with("comments_task") {
                    CoreError::NotFound("Task")
                } else {
                    CoreError::NotFound("Account")
                }
            }
            StoreError::CheckViolation { constraint } => {
                if constraint.contains("self_follow") {
                    CoreError::validation("account_id", "Accounts cannot follow themselves")
                } else {
                    CoreError::Storage(format!("Check constraint violated: {}", constraint))
                }
            }
            StoreError::Database(msg) => CoreError::Storage(msg),
        }
    }
}

impl From<PasswordError> for CoreError {
    fn from(err: PasswordError) -> Self {
        CoreError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for CoreError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => CoreError::TokenExpired,
            JwtError::CreateError(msg) => CoreError::Internal(msg),
            _ => CoreError::TokenInvalid,
        }
    }
}

impl From<MailError> for CoreError {
    fn from(err: MailError) -> Self {
        CoreError::Delivery(err.to_string())
    }
}
