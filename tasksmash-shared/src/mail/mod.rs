/// Outbound mail
///
/// Services hand messages to a [`MailSender`]. Production wires a
/// [`mailgun::MailgunClient`] behind a [`outbox::MailOutbox`] so request
/// handlers only enqueue; development without Mailgun credentials falls back
/// to [`LogMailer`].
///
/// # Sender Contract
///
/// Implementations must never put the message body into an error or a log
/// line: bodies carry password reset links.
///
/// # Example
///
/// ```no_run
/// use tasksmash_shared::mail::{LogMailer, MailMessage, MailSender};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mailer = LogMailer;
/// mailer
///     .send(MailMessage::new("alice@example.com", "Hello", "Body text"))
///     .await?;
/// # Ok(())
/// # }
/// ```

pub mod mailgun;
pub mod outbox;

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Mail error types
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Transport failed before a response arrived
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status
    #[error("Mail provider rejected the message with status {status}")]
    Rejected { status: u16 },

    /// Outbox is at capacity
    #[error("Mail outbox is full")]
    QueueFull,

    /// Outbox dispatcher has stopped
    #[error("Mail outbox is closed")]
    Closed,
}

/// Mail result type alias
pub type MailResult<T> = Result<T, MailError>;

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Creates a new message
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        MailMessage {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Anything that can take a message off our hands
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Sender name for logs
    fn name(&self) -> &str;

    /// Hands the message over for delivery
    async fn send(&self, message: MailMessage) -> MailResult<()>;
}

/// Development sender that only logs recipient and subject
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: MailMessage) -> MailResult<()> {
        tracing::info!(
            recipient = %message.recipient,
            subject = %message.subject,
            "Mail delivery disabled, message dropped"
        );
        Ok(())
    }
}

/// In-memory sender that keeps every message
///
/// Used by tests to read back reset links. A failing recorder rejects every
/// message, which simulates a provider outage.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    messages: Mutex<Vec<MailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    /// Creates a recorder that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that rejects everything
    pub fn failing() -> Self {
        RecordingMailer {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages accepted so far
    pub fn messages(&self) -> Vec<MailMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// The most recent accepted message
    pub fn last(&self) -> Option<MailMessage> {
        self.messages().pop()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: MailMessage) -> MailResult<()> {
        if self.fail {
            return Err(MailError::Rejected { status: 503 });
        }

        match self.messages.lock() {
            Ok(mut messages) => messages.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
        Ok(())
    }
}
