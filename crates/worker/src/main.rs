use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use maplewatch_core::RosterStore;
use maplewatch_db::{MySqlRosterSource, RosterSource};
use maplewatch_events::{LogNotifier, Notifier, WebhookNotifier};
use maplewatch_worker::{
    build_app, CommandState, CycleStats, PollScheduler, SchedulerSettings, WorkerConfig,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = concat!(
    "maplewatch_worker=info,maplewatch_core=info,",
    "maplewatch_events=info,maplewatch_db=info,tower_http=info"
);

/// How long shutdown waits for an in-flight poll cycle to finish.
const SCHEDULER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        host = %config.host,
        port = config.port,
        poll_interval_secs = config.poll_interval.as_secs(),
        webhook = config.webhook_url.is_some(),
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = match maplewatch_db::create_pool(&config.database_url, config.fetch_timeout) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Invalid database URL");
            std::process::exit(1);
        }
    };
    match maplewatch_db::health_check(&pool).await {
        Ok(()) => tracing::info!("Database health check passed"),
        Err(e) => tracing::warn!(error = %e, "Database not reachable yet, polling will retry"),
    }
    let source: Arc<dyn RosterSource> =
        Arc::new(MySqlRosterSource::new(pool, config.excluded.clone()));

    // --- Notifier ---
    let notifier: Arc<dyn Notifier> = if config.webhook_url.is_some() {
        match WebhookNotifier::new() {
            Ok(notifier) => Arc::new(notifier),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build webhook client");
                std::process::exit(1);
            }
        }
    } else {
        tracing::info!("NOTIFY_WEBHOOK_URL not set, notifications go to the log");
        Arc::new(LogNotifier::new())
    };

    // --- Shared state ---
    let store = Arc::new(RosterStore::new());
    let stats = Arc::new(CycleStats::new());

    // --- Command server ---
    let addr = match config.host.parse() {
        Ok(ip) => SocketAddr::new(ip, config.port),
        Err(e) => {
            tracing::error!(host = %config.host, error = %e, "Invalid HOST");
            std::process::exit(1);
        }
    };
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind command server");
            std::process::exit(1);
        }
    };
    let app = build_app(CommandState {
        store: Arc::clone(&store),
        stats: Arc::clone(&stats),
        report_rows: config.report_rows,
    });

    // --- Poll scheduler ---
    let cancel = CancellationToken::new();
    let scheduler = PollScheduler::new(
        source,
        notifier,
        store,
        stats,
        SchedulerSettings::from_config(&config),
    );
    let scheduler_handle = tokio::spawn(scheduler.run(cancel.clone()));

    tracing::info!("Starting command server on {addr}");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Command server error");
    }

    // --- Post-shutdown cleanup ---
    cancel.cancel();
    if tokio::time::timeout(SCHEDULER_SHUTDOWN_TIMEOUT, scheduler_handle)
        .await
        .is_err()
    {
        tracing::warn!("Poll scheduler did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
