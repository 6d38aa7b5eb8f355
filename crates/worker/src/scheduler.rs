//! Fixed-interval roster poll loop.
//!
//! Each cycle walks `Idle -> Fetching -> Detecting -> Notifying ->
//! Committing -> Idle`. A fetch failure returns to `Idle` without touching
//! the committed roster; the building generation is discarded when its
//! [`CycleHandle`](maplewatch_core::CycleHandle) goes out of scope.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use maplewatch_core::{detect, RosterError, RosterStore, TrackedNames};
use maplewatch_db::{RosterSource, SourceError};
use maplewatch_events::{wait_until_ready, Destination, Notifier, ReadinessConfig};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;

// ---------------------------------------------------------------------------
// Phases and errors
// ---------------------------------------------------------------------------

/// Where a poll cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Detecting,
    Notifying,
    Committing,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Detecting => "detecting",
            Self::Notifying => "notifying",
            Self::Committing => "committing",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a cycle ended without committing.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("Roster fetch failed: {0}")]
    Fetch(#[from] SourceError),

    #[error("Roster fetch timed out after {0:?}")]
    FetchTimeout(Duration),
}

/// Outcome of a committed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub generation: u64,
    pub fetched: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

// ---------------------------------------------------------------------------
// CycleStats
// ---------------------------------------------------------------------------

/// Counters shared between the scheduler and the command server.
#[derive(Debug, Default)]
pub struct CycleStats {
    fetches: AtomicU64,
    last_fetch_ms: AtomicU64,
    cycles_committed: AtomicU64,
    cycles_failed: AtomicU64,
    notifications_sent: AtomicU64,
    notifications_failed: AtomicU64,
}

/// Point-in-time copy of [`CycleStats`].
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub last_fetch_ms: Option<u64>,
    pub cycles_committed: u64,
    pub cycles_failed: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
}

impl CycleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration of the most recent successful fetch.
    pub fn last_fetch_latency(&self) -> Option<Duration> {
        if self.fetches.load(Ordering::Relaxed) == 0 {
            return None;
        }
        Some(Duration::from_millis(self.last_fetch_ms.load(Ordering::Relaxed)))
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            last_fetch_ms: self.last_fetch_latency().map(|d| d.as_millis() as u64),
            cycles_committed: self.cycles_committed.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            notifications_sent: self.notifications_sent.load(Ordering::Relaxed),
            notifications_failed: self.notifications_failed.load(Ordering::Relaxed),
        }
    }

    fn record_fetch(&self, latency: Duration) {
        self.last_fetch_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    fn record_commit(&self, report: &CycleReport) {
        self.cycles_committed.fetch_add(1, Ordering::Relaxed);
        self.notifications_sent
            .fetch_add(report.notifications_sent as u64, Ordering::Relaxed);
        self.notifications_failed
            .fetch_add(report.notifications_failed as u64, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// PollScheduler
// ---------------------------------------------------------------------------

/// Scheduler settings, passed in at construction.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub tracked: TrackedNames,
    pub destination: Destination,
    pub readiness: ReadinessConfig,
}

impl SchedulerSettings {
    pub fn from_config(config: &WorkerConfig) -> Self {
        let destination = match &config.webhook_url {
            Some(url) => Destination::new(url.clone()),
            None => Destination::new("log"),
        };
        Self {
            poll_interval: config.poll_interval,
            fetch_timeout: config.fetch_timeout,
            tracked: config.tracked.clone(),
            destination,
            readiness: ReadinessConfig::default(),
        }
    }
}

/// Drives the fetch -> detect -> notify -> commit cycle.
pub struct PollScheduler {
    source: Arc<dyn RosterSource>,
    notifier: Arc<dyn Notifier>,
    store: Arc<RosterStore>,
    stats: Arc<CycleStats>,
    settings: SchedulerSettings,
}

impl PollScheduler {
    pub fn new(
        source: Arc<dyn RosterSource>,
        notifier: Arc<dyn Notifier>,
        store: Arc<RosterStore>,
        stats: Arc<CycleStats>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            stats,
            settings,
        }
    }

    /// Run cycles until `cancel` is triggered.
    ///
    /// Waits for the notifier to become ready first. The next cycle starts
    /// `poll_interval` after the previous one finished, so cycles never
    /// overlap. Cancellation is observed between cycles only.
    pub async fn run(self, cancel: CancellationToken) {
        let ready = wait_until_ready(
            self.notifier.as_ref(),
            &self.settings.destination,
            &self.settings.readiness,
            &cancel,
        )
        .await;
        if !ready {
            return;
        }

        tracing::info!(
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            fetch_timeout_secs = self.settings.fetch_timeout.as_secs(),
            "Roster poll loop started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match self.run_cycle().await {
                Ok(report) => {
                    tracing::info!(
                        generation = report.generation,
                        fetched = report.fetched,
                        sent = report.notifications_sent,
                        failed = report.notifications_failed,
                        "Poll cycle committed"
                    );
                }
                Err(e) => {
                    self.stats.record_failure();
                    tracing::error!(error = %e, "Poll cycle aborted");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        tracing::info!("Roster poll loop stopped");
    }

    /// Execute one complete cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let mut handle = self.store.begin_cycle()?;
        let generation = handle.id();

        // -- Fetching --
        tracing::debug!(generation, phase = %CyclePhase::Fetching, "Fetching roster");
        let started = Instant::now();
        let characters =
            match tokio::time::timeout(self.settings.fetch_timeout, self.source.fetch()).await {
                Ok(result) => result?,
                Err(_) => return Err(CycleError::FetchTimeout(self.settings.fetch_timeout)),
            };
        self.stats.record_fetch(started.elapsed());

        let fetched = characters.len();
        for character in characters {
            handle.insert(character);
        }

        // -- Detecting --
        tracing::debug!(generation, phase = %CyclePhase::Detecting, fetched, "Detecting changes");
        let previous = self.store.snapshot();
        if previous.is_empty() {
            tracing::info!("No previous roster yet, nothing to compare");
        }
        let notifications = detect(&previous, handle.building(), &self.settings.tracked);

        // -- Notifying --
        tracing::debug!(
            generation,
            phase = %CyclePhase::Notifying,
            count = notifications.len(),
            "Dispatching notifications"
        );
        let mut sent = 0;
        let mut failed = 0;
        for notification in &notifications {
            let message = notification.message();
            match self
                .notifier
                .send(&self.settings.destination, &message)
                .await
            {
                Ok(()) => {
                    sent += 1;
                    tracing::info!(message = %message, "Notification sent");
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(message = %message, error = %e, "Notification delivery failed");
                }
            }
        }

        // -- Committing --
        tracing::debug!(generation, phase = %CyclePhase::Committing, "Committing roster");
        let (_, committed) = self.store.commit(handle)?;

        let report = CycleReport {
            generation: committed.id(),
            fetched,
            notifications_sent: sent,
            notifications_failed: failed,
        };
        self.stats.record_commit(&report);
        tracing::debug!(generation, phase = %CyclePhase::Idle, "Cycle complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_as_str() {
        assert_eq!(CyclePhase::Idle.as_str(), "idle");
        assert_eq!(CyclePhase::Fetching.to_string(), "fetching");
        assert_eq!(CyclePhase::Committing.to_string(), "committing");
    }

    #[test]
    fn stats_report_no_latency_before_first_fetch() {
        let stats = CycleStats::new();
        assert!(stats.last_fetch_latency().is_none());
        assert!(stats.snapshot().last_fetch_ms.is_none());
    }

    #[test]
    fn stats_accumulate_commits() {
        let stats = CycleStats::new();
        stats.record_fetch(Duration::from_millis(42));
        stats.record_commit(&CycleReport {
            generation: 1,
            fetched: 3,
            notifications_sent: 2,
            notifications_failed: 1,
        });
        stats.record_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.last_fetch_ms, Some(42));
        assert_eq!(snap.cycles_committed, 1);
        assert_eq!(snap.cycles_failed, 1);
        assert_eq!(snap.notifications_sent, 2);
        assert_eq!(snap.notifications_failed, 1);
    }

    #[test]
    fn settings_fall_back_to_log_destination() {
        let config = WorkerConfig::from_lookup(|var| {
            (var == "DATABASE_URL").then(|| "mysql://x".to_string())
        })
        .unwrap();
        let settings = SchedulerSettings::from_config(&config);
        assert_eq!(settings.destination.as_str(), "log");
        assert_eq!(settings.poll_interval, Duration::from_secs(60));
    }
}
