use tokio::sync::mpsc;
use tracing::info;

use crate::error::{Error, Result};

use super::Reminder;

/// Delivers reminders to the user.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Deliver one reminder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Notification`] if delivery fails.
    async fn notify(&self, reminder: &Reminder) -> Result<()>;
}

/// Writes reminders to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, reminder: &Reminder) -> Result<()> {
        info!(
            medication_id = reminder.medication_id,
            "{}: {}", reminder.title, reminder.body
        );
        Ok(())
    }
}

/// Forwards reminders into a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Reminder>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Reminder>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl Notifier for ChannelNotifier {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn notify(&self, reminder: &Reminder) -> Result<()> {
        self.tx
            .send(reminder.clone())
            .await
            .map_err(|_| Error::notification("reminder receiver dropped"))
    }
}
