/// Queued mail hand-off
///
/// [`MailOutbox`] is itself a [`MailSender`]: `send` only enqueues onto a
/// bounded channel and returns. A dispatcher task drains the channel into the
/// real sender and logs failures by recipient.
///
/// # Shutdown
///
/// Cancelling the token stops intake; messages already queued are still
/// delivered before the dispatcher exits.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasksmash_shared::mail::{outbox::MailOutbox, LogMailer, MailMessage, MailSender};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let shutdown = CancellationToken::new();
/// let (outbox, dispatcher) = MailOutbox::spawn(Arc::new(LogMailer), 100, shutdown.clone());
///
/// outbox.send(MailMessage::new("a@example.com", "Hi", "Body")).await?;
///
/// shutdown.cancel();
/// dispatcher.await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{MailError, MailMessage, MailResult, MailSender};

/// Sending half of the queue
#[derive(Debug, Clone)]
pub struct MailOutbox {
    tx: mpsc::Sender<MailMessage>,
}

impl MailOutbox {
    /// Creates the queue without a dispatcher
    ///
    /// The caller owns the receiver and passes it to [`run_dispatcher`].
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MailMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (MailOutbox { tx }, rx)
    }

    /// Creates the queue and spawns its dispatcher on the current runtime
    pub fn spawn(
        sender: Arc<dyn MailSender>,
        capacity: usize,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (outbox, rx) = Self::new(capacity);
        let handle = tokio::spawn(run_dispatcher(rx, sender, shutdown));
        (outbox, handle)
    }
}

#[async_trait]
impl MailSender for MailOutbox {
    fn name(&self) -> &str {
        "outbox"
    }

    async fn send(&self, message: MailMessage) -> MailResult<()> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MailError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => MailError::Closed,
        })
    }
}

async fn deliver(sender: &dyn MailSender, message: MailMessage) {
    let recipient = message.recipient.clone();

    match sender.send(message).await {
        Ok(()) => tracing::info!(recipient = %recipient, sender = sender.name(), "Mail delivered"),
        Err(e) => tracing::error!(
            recipient = %recipient,
            sender = sender.name(),
            error = %e,
            "Mail delivery failed"
        ),
    }
}

/// Drains the queue into `sender` until cancelled or every outbox is dropped
pub async fn run_dispatcher(
    mut rx: mpsc::Receiver<MailMessage>,
    sender: Arc<dyn MailSender>,
    shutdown: CancellationToken,
) {
    tracing::info!(sender = sender.name(), "Mail dispatcher started");

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            message = rx.recv() => match message {
                Some(message) => deliver(sender.as_ref(), message).await,
                None => break,
            },
        }
    }

    rx.close();
    let mut drained = 0usize;
    while let Ok(message) = rx.try_recv() {
        deliver(sender.as_ref(), message).await;
        drained += 1;
    }

    tracing::info!(drained, "Mail dispatcher stopped");
}
