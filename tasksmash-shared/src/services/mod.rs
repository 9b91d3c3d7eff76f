/// Domain services
///
/// Every operation the API exposes lives here. Services hold an
/// `Arc<dyn Store>` and receive the acting account as an explicit argument;
/// none of them read request or session state.
///
/// # Services
///
/// - [`accounts::AccountService`]: registration, login, password change
/// - [`tasks::TaskService`]: task CRUD with owner checks
/// - [`comments::CommentService`]: comments, replies and threads
/// - [`social::SocialService`]: follow / unfollow
/// - [`dashboard::DashboardService`]: own, followed and suggested views
/// - [`password_reset::PasswordResetService`]: reset tokens and mail
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasksmash_shared::mail::LogMailer;
/// use tasksmash_shared::services::{Services, TokenSettings};
/// use tasksmash_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let services = Services::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(LogMailer),
///     TokenSettings::new("a-secret-that-is-at-least-32-bytes!"),
///     "http://localhost:8080",
/// );
///
/// let alice = services.accounts.register("alice", "a@x.com", "pw123").await?;
/// services.tasks.create_task(alice.id, "Water the plants").await?;
/// # Ok(())
/// # }
/// ```

pub mod accounts;
pub mod comments;
pub mod dashboard;
pub mod password_reset;
pub mod social;
pub mod tasks;
pub mod validation;

use std::sync::Arc;

use chrono::Duration;

use crate::mail::MailSender;
use crate::store::Store;

/// Signing secret and token lifetimes
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
}

impl TokenSettings {
    /// Default lifetimes: 24h sessions, 1h reset links
    pub fn new(secret: impl Into<String>) -> Self {
        TokenSettings {
            secret: secret.into(),
            session_ttl: Duration::hours(24),
            reset_ttl: Duration::hours(1),
        }
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .finish()
    }
}

/// All services over one store
#[derive(Clone)]
pub struct Services {
    pub accounts: accounts::AccountService,
    pub tasks: tasks::TaskService,
    pub comments: comments::CommentService,
    pub social: social::SocialService,
    pub dashboard: dashboard::DashboardService,
    pub password_reset: password_reset::PasswordResetService,
}

impl Services {
    pub fn new(
        store: Arc<dyn Store>,
        mailer: Arc<dyn MailSender>,
        tokens: TokenSettings,
        public_base_url: impl Into<String>,
    ) -> Self {
        Services {
            accounts: accounts::AccountService::new(store.clone(), tokens.clone()),
            tasks: tasks::TaskService::new(store.clone()),
            comments: comments::CommentService::new(store.clone()),
            social: social::SocialService::new(store.clone()),
            dashboard: dashboard::DashboardService::new(store.clone()),
            password_reset: password_reset::PasswordResetService::new(
                store,
                mailer,
                tokens,
                public_base_url,
            ),
        }
    }
}
