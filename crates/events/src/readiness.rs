//! Readiness gate for the notifier.
//!
//! The poll scheduler must not produce notifications before they can be
//! delivered. [`wait_until_ready`] polls the notifier with exponential
//! backoff until it reports ready or the [`CancellationToken`] fires.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::notifier::{Destination, Notifier};

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Delay after the first failed readiness check.
    pub initial_delay: Duration,
    /// Upper bound on the delay between readiness checks.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ReadinessConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReadinessConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Block until `notifier` accepts dispatches to `destination`.
///
/// Returns `true` once ready, or `false` if `cancel` is triggered first.
pub async fn wait_until_ready(
    notifier: &dyn Notifier,
    destination: &Destination,
    config: &ReadinessConfig,
    cancel: &CancellationToken,
) -> bool {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Readiness wait cancelled");
                return false;
            }
            result = notifier.ready(destination) => {
                match result {
                    Ok(()) => {
                        tracing::info!(attempt, "Notifier ready");
                        return true;
                    }
                    Err(e) => {
                        tracing::warn!(
                            attempt,
                            error = %e,
                            delay_ms = delay.as_millis() as u64,
                            "Notifier not ready",
                        );
                    }
                }
            }
        }

        // Wait before the next readiness check, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, config);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::notifier::NotifyError;

    /// Fails the first `failures` readiness checks, then reports ready.
    struct FlakyNotifier {
        failures: u32,
        checks: AtomicU32,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn ready(&self, _destination: &Destination) -> Result<(), NotifyError> {
            let n = self.checks.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(NotifyError::HttpStatus(503))
            } else {
                Ok(())
            }
        }

        async fn send(
            &self,
            _destination: &Destination,
            _message: &str,
        ) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn fast_config() -> ReadinessConfig {
        ReadinessConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            multiplier: 2.0,
        }
    }

    #[test]
    fn next_delay_doubles() {
        let config = ReadinessConfig::default();
        assert_eq!(next_delay(Duration::from_secs(1), &config), Duration::from_secs(2));
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let config = ReadinessConfig {
            max_delay: Duration::from_secs(10),
            ..Default::default()
        };
        assert_eq!(next_delay(Duration::from_secs(8), &config), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn ready_after_transient_failures() {
        let notifier = FlakyNotifier {
            failures: 3,
            checks: AtomicU32::new(0),
        };
        let cancel = CancellationToken::new();
        let ready =
            wait_until_ready(&notifier, &Destination::new("test"), &fast_config(), &cancel).await;
        assert!(ready);
        assert_eq!(notifier.checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn cancellation_stops_waiting() {
        let notifier = FlakyNotifier {
            failures: u32::MAX,
            checks: AtomicU32::new(0),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ready =
            wait_until_ready(&notifier, &Destination::new("test"), &fast_config(), &cancel).await;
        assert!(!ready);
    }
}
