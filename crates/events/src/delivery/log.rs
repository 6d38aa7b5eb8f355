//! Log-only notifier.
//!
//! Used when no webhook is configured: every notification is written to the
//! tracing output instead of a chat channel.

use async_trait::async_trait;

use crate::notifier::{Destination, Notifier, NotifyError};

#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, destination: &Destination, message: &str) -> Result<(), NotifyError> {
        tracing::info!(%destination, message, "Notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_is_always_ready_and_accepts_messages() {
        let notifier = LogNotifier::new();
        let dest = Destination::new("log");
        assert!(notifier.ready(&dest).await.is_ok());
        assert!(notifier.send(&dest, "Alice is now level 10!").await.is_ok());
    }
}
