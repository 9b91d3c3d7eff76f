/// Mailgun HTTP API client
///
/// Sends plain-text mail through `POST {api_base}/{domain}/messages` with
/// HTTP basic auth (`api:<key>`). The sender appears as
/// `Password Reset <sender>` since reset links are the only mail we send.

use async_trait::async_trait;
use std::time::Duration;

use super::{MailError, MailMessage, MailResult, MailSender};

/// Default Mailgun API base (US region)
pub const DEFAULT_API_BASE: &str = "https://api.mailgun.net/v3";

/// Mailgun credentials and endpoint
#[derive(Debug, Clone)]
pub struct MailgunConfig {
    /// Sending domain registered with Mailgun
    pub domain: String,

    /// Private API key
    pub api_key: String,

    /// From address
    pub sender: String,

    /// API base, without trailing slash
    pub api_base: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl MailgunConfig {
    /// Creates a config against the default API base
    pub fn new(
        domain: impl Into<String>,
        api_key: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        MailgunConfig {
            domain: domain.into(),
            api_key: api_key.into(),
            sender: sender.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Full messages endpoint
    pub fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base.trim_end_matches('/'), self.domain)
    }

    /// Display form of the from address
    pub fn from_header(&self) -> String {
        format!("Password Reset <{}>", self.sender)
    }
}

/// Mailgun sender
#[derive(Debug, Clone)]
pub struct MailgunClient {
    client: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunClient {
    /// Creates a client
    ///
    /// # Errors
    ///
    /// Returns `MailError::Transport` if the HTTP client cannot be built
    pub fn new(config: MailgunConfig) -> MailResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(MailgunClient { client, config })
    }

    /// Borrow the configuration
    pub fn config(&self) -> &MailgunConfig {
        &self.config
    }
}

#[async_trait]
impl MailSender for MailgunClient {
    fn name(&self) -> &str {
        "mailgun"
    }

    async fn send(&self, message: MailMessage) -> MailResult<()> {
        let from = self.config.from_header();
        let form = [
            ("from", from.as_str()),
            ("to", message.recipient.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.body.as_str()),
        ];

        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await
            // without_url keeps the endpoint out of the error text
            .map_err(|e| MailError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(
            recipient = %message.recipient,
            status = status.as_u16(),
            "Mailgun accepted message"
        );

        Ok(())
    }
}
