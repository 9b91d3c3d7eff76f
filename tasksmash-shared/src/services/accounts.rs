/// Account registration, login and credential changes

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{validation, TokenSettings};
use crate::auth::jwt::{create_token, Claims, TokenType};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{CoreError, CoreResult};
use crate::models::account::{Account, AccountId, CreateAccount};
use crate::store::Store;

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Result of a successful login or registration
#[derive(Debug, Clone, Serialize)]
pub struct SessionGrant {
    pub account: Account,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Account operations
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: TokenSettings,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenSettings) -> Self {
        AccountService { store, tokens }
    }

    /// Registers a new account
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed username, email or password
    /// - `Conflict` when the username (checked first) or email is taken
    pub async fn register(&self, username: &str, email: &str, password: &str) -> CoreResult<Account> {
        let username = validation::username(username)?;
        let email = validation::email(email)?;
        validation::new_password(password)?;

        // Early checks give a stable error order; the unique constraints
        // still decide under concurrent registrations.
        if self.store.find_account_by_username(&username).await?.is_some() {
            tracing::warn!(username = %username, "Registration rejected: username taken");
            return Err(CoreError::Conflict("Username already taken".to_string()));
        }
        if self.store.find_account_by_email(&email).await?.is_some() {
            tracing::warn!(username = %username, "Registration rejected: email taken");
            return Err(CoreError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        let account = self
            .store
            .create_account(CreateAccount {
                username,
                email,
                password_hash,
            })
            .await?;

        tracing::info!(account_id = account.id, "Account registered");
        Ok(account)
    }

    /// Issues a session token for an existing account
    pub fn issue_session(&self, account: Account) -> CoreResult<SessionGrant> {
        let claims = Claims::with_expiration(account.id, TokenType::Session, self.tokens.session_ttl);
        let token = create_token(&claims, &self.tokens.secret)?;

        Ok(SessionGrant {
            expires_at: claims.expires_at(),
            account,
            token,
        })
    }

    /// Checks credentials and opens a session
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn authenticate(&self, username: &str, password: &str) -> CoreResult<SessionGrant> {
        let account = self
            .store
            .find_account_by_username(username.trim())
            .await?
            .ok_or_else(|| CoreError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

        if !verify_password(password, &account.password_hash)? {
            tracing::warn!(account_id = account.id, "Login rejected: wrong password");
            return Err(CoreError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        tracing::info!(account_id = account.id, "Login succeeded");
        self.issue_session(account)
    }

    /// Replaces the password after checking the current one
    pub async fn change_password(
        &self,
        account_id: AccountId,
        current_password: &str,
        new_password: &str,
    ) -> CoreResult<()> {
        let account = self.get(account_id).await?;

        if !verify_password(current_password, &account.password_hash)? {
            tracing::warn!(account_id, "Password change rejected: wrong current password");
            return Err(CoreError::Unauthorized("Current password is incorrect".to_string()));
        }

        validation::new_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        if !self.store.update_password_hash(account_id, &password_hash).await? {
            return Err(CoreError::NotFound("Account"));
        }

        tracing::info!(account_id, "Password changed");
        Ok(())
    }

    /// Loads an account
    pub async fn get(&self, account_id: AccountId) -> CoreResult<Account> {
        self.store
            .find_account(account_id)
            .await?
            .ok_or(CoreError::NotFound("Account"))
    }

    /// Accounts `account_id` follows, by username
    pub async fn list_following(&self, account_id: AccountId) -> CoreResult<Vec<Account>> {
        self.get(account_id).await?;
        Ok(self.store.list_followees(account_id).await?)
    }

    /// Accounts following `account_id`, by username
    pub async fn list_followers(&self, account_id: AccountId) -> CoreResult<Vec<Account>> {
        self.get(account_id).await?;
        Ok(self.store.list_followers(account_id).await?)
    }

    /// Removes an account with its tasks, comments and follow edges
    ///
    /// Returns false when the account did not exist.
    pub async fn delete_account(&self, account_id: AccountId) -> CoreResult<bool> {
        let deleted = self.store.delete_account_cascade(account_id).await?;

        if deleted {
            tracing::info!(account_id, "Account deleted");
        }
        Ok(deleted)
    }
}
