//! Roster poll worker.
//!
//! Wires the MySQL roster source, the change detector and the notifier into
//! a fixed-interval poll loop, and serves the committed roster over a small
//! HTTP command server.

pub mod commands;
pub mod config;
pub mod scheduler;

pub use commands::{build_app, AppError, CommandState};
pub use config::{ConfigError, WorkerConfig};
pub use scheduler::{
    CycleError, CyclePhase, CycleReport, CycleStats, PollScheduler, SchedulerSettings,
};
