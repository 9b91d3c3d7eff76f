/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: bind address (default: 0.0.0.0:8080)
/// - `API_PRODUCTION`: enables HSTS (default: false)
/// - `CORS_ORIGINS`: comma separated origins (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string; unset selects the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: token signing key, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: session lifetime (default: 24)
/// - `RESET_TOKEN_TTL_MINUTES`: reset link lifetime (default: 60)
/// - `PUBLIC_BASE_URL`: base of reset links (default: http://localhost:8080)
/// - `MAILGUN_DOMAIN`, `MAILGUN_API_KEY`, `SENDER_EMAIL`: enable Mailgun when all set
/// - `MAILGUN_API_BASE`: Mailgun API base
/// - `MAIL_OUTBOX_CAPACITY`: queued mail capacity (default: 100)
///
/// # Example
///
/// ```no_run
/// use tasksmash_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tasksmash_shared::mail::mailgun::{MailgunConfig, DEFAULT_API_BASE};
use tasksmash_shared::services::TokenSettings;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration; `None` runs on the in-memory store
    pub database: Option<DatabaseConfig>,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Outgoing mail configuration
    pub mail: MailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode (enables HSTS)
    pub production: bool,

    /// Allowed CORS origins, `*` for any
    pub cors_origins: Vec<String>,

    /// Base URL used in links sent by mail
    pub public_base_url: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session token lifetime in hours
    pub session_ttl_hours: i64,

    /// Reset token lifetime in minutes
    pub reset_ttl_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("reset_ttl_minutes", &self.reset_ttl_minutes)
            .finish()
    }
}

/// Mail configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub mailgun_domain: Option<String>,
    pub mailgun_api_key: Option<String>,
    pub sender_email: Option<String>,
    pub mailgun_api_base: String,

    /// Capacity of the queued outbox
    pub outbox_capacity: usize,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("mailgun_domain", &self.mailgun_domain)
            .field("mailgun_api_key", &self.mailgun_api_key.as_ref().map(|_| "<redacted>"))
            .field("sender_email", &self.sender_email)
            .field("mailgun_api_base", &self.mailgun_api_base)
            .field("outbox_capacity", &self.outbox_capacity)
            .finish()
    }
}

impl MailConfig {
    /// Mailgun settings when domain, key and sender are all present
    pub fn mailgun(&self) -> Option<MailgunConfig> {
        match (&self.mailgun_domain, &self.mailgun_api_key, &self.sender_email) {
            (Some(domain), Some(api_key), Some(sender)) => {
                let mut config = MailgunConfig::new(domain.as_str(), api_key.as_str(), sender.as_str());
                config.api_base = self.mailgun_api_base.clone();
                Some(config)
            }
            _ => None,
        }
    }
}

/// Reads an optional variable, treating empty values as unset
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Reads and parses a variable with a default
fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value: {}", name, e)),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let jwt_secret = optional("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let database = optional("DATABASE_URL")
            .map(|url| -> anyhow::Result<DatabaseConfig> {
                Ok(DatabaseConfig {
                    url,
                    max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10)?,
                })
            })
            .transpose()?;

        let cors_origins = optional("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let config = Self {
            api: ApiConfig {
                host: optional("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed("API_PORT", 8080)?,
                production: parsed("API_PRODUCTION", false)?,
                cors_origins,
                public_base_url: optional("PUBLIC_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:8080".to_string()),
            },
            database,
            jwt: JwtConfig {
                secret: jwt_secret,
                session_ttl_hours: parsed("SESSION_TTL_HOURS", 24)?,
                reset_ttl_minutes: parsed("RESET_TOKEN_TTL_MINUTES", 60)?,
            },
            mail: MailConfig {
                mailgun_domain: optional("MAILGUN_DOMAIN"),
                mailgun_api_key: optional("MAILGUN_API_KEY"),
                sender_email: optional("SENDER_EMAIL"),
                mailgun_api_base: optional("MAILGUN_API_BASE")
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                outbox_capacity: parsed("MAIL_OUTBOX_CAPACITY", 100)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field rules
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        if self.jwt.session_ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }
        if self.jwt.reset_ttl_minutes <= 0 {
            anyhow::bail!("RESET_TOKEN_TTL_MINUTES must be positive");
        }
        if self.mail.outbox_capacity == 0 {
            anyhow::bail!("MAIL_OUTBOX_CAPACITY must be at least 1");
        }
        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Signing secret and lifetimes for the services
    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            secret: self.jwt.secret.clone(),
            session_ttl: Duration::hours(self.jwt.session_ttl_hours),
            reset_ttl: Duration::minutes(self.jwt.reset_ttl_minutes),
        }
    }

    /// Development defaults around `secret`, in-memory store, no Mailgun
    pub fn for_testing(secret: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                production: false,
                cors_origins: vec!["*".to_string()],
                public_base_url: "http://localhost:8080".to_string(),
            },
            database: None,
            jwt: JwtConfig {
                secret: secret.into(),
                session_ttl_hours: 24,
                reset_ttl_minutes: 60,
            },
            mail: MailConfig {
                mailgun_domain: None,
                mailgun_api_key: None,
                sender_email: None,
                mailgun_api_base: DEFAULT_API_BASE.to_string(),
                outbox_capacity: 100,
            },
        }
    }
}
