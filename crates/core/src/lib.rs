//! Roster snapshot and change-detection engine.
//!
//! Everything in this crate is synchronous and free of I/O so that it can be
//! driven by the worker's poll loop and exercised directly from tests:
//!
//! - [`jobs`] -- job code to class name table.
//! - [`character`] -- the immutable [`Character`] record.
//! - [`roster`] -- double-buffered [`RosterStore`] with atomic commit.
//! - [`detector`] -- pairwise diff of two generations into [`Notification`]s.
//! - [`report`] -- fixed-width rank table rendering.

pub mod character;
pub mod detector;
pub mod error;
pub mod jobs;
pub mod report;
pub mod roster;
pub mod types;

pub use character::Character;
pub use detector::{detect, Notification, RosterEvent, TrackedNames};
pub use error::RosterError;
pub use roster::{CycleHandle, Generation, RosterStore};
