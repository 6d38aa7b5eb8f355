//! Outbound notification delivery.
//!
//! - [`Notifier`] -- the seam the poll scheduler dispatches messages through.
//! - [`delivery`] -- concrete notifiers (chat webhook, log-only).
//! - [`readiness`] -- waits for a notifier to accept dispatches before the
//!   scheduler starts polling.

pub mod delivery;
pub mod notifier;
pub mod readiness;

pub use delivery::log::LogNotifier;
pub use delivery::webhook::WebhookNotifier;
pub use notifier::{Destination, Notifier, NotifyError};
pub use readiness::{wait_until_ready, ReadinessConfig};
