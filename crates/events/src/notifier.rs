//! The notifier seam.

use std::fmt;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

/// Opaque handle naming where a message goes.
///
/// Its meaning belongs to the notifier: a webhook URL for
/// [`WebhookNotifier`](crate::WebhookNotifier), a free-form label for
/// [`LogNotifier`](crate::LogNotifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination(String);

impl Destination {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure to deliver one message. Never aborts a poll cycle.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Notifier returned HTTP {0}")]
    HttpStatus(u16),

    /// The notifier refused the message without a transport error.
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Delivers text messages to a destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Check that `destination` can accept messages.
    ///
    /// The default is always ready.
    async fn ready(&self, _destination: &Destination) -> Result<(), NotifyError> {
        Ok(())
    }

    /// Deliver a single message.
    async fn send(&self, destination: &Destination, message: &str) -> Result<(), NotifyError>;
}
