//! Chat webhook delivery with exponential-backoff retry.
//!
//! [`WebhookNotifier`] POSTs `{"content": "<message>"}` to the destination
//! URL, the body accepted by Discord-style incoming webhooks. Failed
//! attempts are retried up to three times with exponential backoff
//! (1 s, 2 s, 4 s).

use std::time::Duration;

use async_trait::async_trait;

use crate::notifier::{Destination, Notifier, NotifyError};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest message body chat webhooks accept.
const MAX_CONTENT_CHARS: usize = 2000;

// ---------------------------------------------------------------------------
// WebhookNotifier
// ---------------------------------------------------------------------------

/// Delivers notifications to a chat channel's incoming webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a notifier with a pre-configured HTTP client.
    pub fn new() -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, payload: &serde_json::Value) -> Result<(), NotifyError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    /// A `GET` on an incoming webhook returns its metadata when the URL is
    /// valid, which is enough to know messages will be accepted.
    async fn ready(&self, destination: &Destination) -> Result<(), NotifyError> {
        let response = self.client.get(destination.as_str()).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }

    /// Deliver a message with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    async fn send(&self, destination: &Destination, message: &str) -> Result<(), NotifyError> {
        if message.is_empty() {
            return Err(NotifyError::Rejected("empty message".to_string()));
        }
        let payload = serde_json::json!({ "content": clip_content(message) });
        let url = destination.as_str();

        let mut last_err: Option<NotifyError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(url, &payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(url, &payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(error = %e, "Webhook delivery failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }
}

/// Cut a message to the webhook's content limit on a character boundary.
fn clip_content(message: &str) -> &str {
    match message.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((byte, _)) => &message[..byte],
        None => message,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_fail() {
        assert!(WebhookNotifier::new().is_ok());
    }

    #[test]
    fn short_messages_are_sent_whole() {
        assert_eq!(clip_content("Alice is now level 70!"), "Alice is now level 70!");
    }

    #[test]
    fn long_messages_are_clipped_to_limit() {
        let long = "é".repeat(MAX_CONTENT_CHARS + 50);
        assert_eq!(clip_content(&long).chars().count(), MAX_CONTENT_CHARS);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_without_a_request() {
        let notifier = WebhookNotifier::new().unwrap();
        let dest = Destination::new("http://127.0.0.1:9/unused");
        let err = notifier.send(&dest, "").await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected(_)));
    }

    #[test]
    fn notify_error_display_request() {
        // Build a reqwest error from an invalid URL.
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = NotifyError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
