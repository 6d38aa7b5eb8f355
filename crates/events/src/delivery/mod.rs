//! Concrete notifiers.

pub mod log;
pub mod webhook;
