/// Password reset flow
///
/// Stateless: the token is a signed claim set `{ sub, exp, ... }` and nothing
/// is written when it is issued or consumed. A token therefore remains usable
/// until it expires, even after a successful reset.
///
/// ```text
/// issue_token ──> Valid ──(now >= exp)──> Expired
///                   │
///                   └─ consume_token ──> Valid (still)
/// ```
///
/// Every time-dependent operation has an `_at` variant taking the current
/// instant explicitly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{validation, TokenSettings};
use crate::auth::jwt::{create_token, validate_reset_token_at, Claims, TokenType};
use crate::auth::password::hash_password;
use crate::error::{CoreError, CoreResult};
use crate::mail::{MailMessage, MailSender};
use crate::models::account::AccountId;
use crate::store::Store;

/// Subject line of the reset mail
pub const RESET_SUBJECT: &str = "Password Reset Request";

/// A freshly issued token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedResetToken {
    pub account_id: AccountId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Verified contents of a reset token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetClaims {
    pub account_id: AccountId,
    pub expires_at: DateTime<Utc>,
}

/// Reset operations
#[derive(Clone)]
pub struct PasswordResetService {
    store: Arc<dyn Store>,
    mailer: Arc<dyn MailSender>,
    tokens: TokenSettings,
    public_base_url: String,
}

impl PasswordResetService {
    pub fn new(
        store: Arc<dyn Store>,
        mailer: Arc<dyn MailSender>,
        tokens: TokenSettings,
        public_base_url: impl Into<String>,
    ) -> Self {
        PasswordResetService {
            store,
            mailer,
            tokens,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Link mailed to the account holder
    pub fn reset_url(&self, token: &str) -> String {
        format!("{}/reset_password/{}", self.public_base_url, token)
    }

    /// Issues a token for the account registered under `email` and mails it
    pub async fn issue_token(&self, email: &str) -> CoreResult<IssuedResetToken> {
        self.issue_token_at(email, Utc::now()).await
    }

    /// [`issue_token`](Self::issue_token) at an explicit instant
    ///
    /// # Errors
    ///
    /// - `NotFound("Account")` when no account has this email
    /// - `Delivery` when the mail hand-off fails; the token was still issued
    ///   and stays valid, but is not returned
    pub async fn issue_token_at(&self, email: &str, now: DateTime<Utc>) -> CoreResult<IssuedResetToken> {
        let email = email.trim().to_lowercase();

        let account = self
            .store
            .find_account_by_email(&email)
            .await?
            .ok_or(CoreError::NotFound("Account"))?;

        let claims = Claims::issued_at(account.id, TokenType::PasswordReset, now, self.tokens.reset_ttl);
        let token = create_token(&claims, &self.tokens.secret)?;

        let body = format!(
            "Click the link to reset your password: {}",
            self.reset_url(&token)
        );

        if let Err(e) = self
            .mailer
            .send(MailMessage::new(account.email.clone(), RESET_SUBJECT, body))
            .await
        {
            tracing::error!(account_id = account.id, error = %e, "Reset mail hand-off failed");
            return Err(e.into());
        }

        tracing::info!(account_id = account.id, "Password reset token issued");
        Ok(IssuedResetToken {
            account_id: account.id,
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Checks signature, type and expiry without changing anything
    pub fn verify_token(&self, token: &str) -> CoreResult<ResetClaims> {
        self.verify_token_at(token, Utc::now())
    }

    /// [`verify_token`](Self::verify_token) at an explicit instant
    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> CoreResult<ResetClaims> {
        let claims = validate_reset_token_at(token, &self.tokens.secret, now)?;

        Ok(ResetClaims {
            account_id: claims.sub,
            expires_at: claims.expires_at(),
        })
    }

    /// Replaces the password of the account named in the token
    pub async fn consume_token(&self, token: &str, new_password: &str) -> CoreResult<()> {
        self.consume_token_at(token, new_password, Utc::now()).await
    }

    /// [`consume_token`](Self::consume_token) at an explicit instant
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` for bad signatures, garbage, or non-reset tokens
    /// - `TokenExpired` when `now >= exp`
    /// - `Validation` when the new password breaks the rules
    /// - `NotFound("Account")` when the account was deleted meanwhile
    pub async fn consume_token_at(
        &self,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        let claims = self.verify_token_at(token, now).map_err(|e| {
            tracing::warn!(error = %e, "Password reset rejected");
            e
        })?;

        validation::new_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        if !self
            .store
            .update_password_hash(claims.account_id, &password_hash)
            .await?
        {
            return Err(CoreError::NotFound("Account"));
        }

        tracing::info!(account_id = claims.account_id, "Password reset");
        Ok(())
    }
}
