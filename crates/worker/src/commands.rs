//! HTTP command server.
//!
//! Serves the rank report and liveness endpoints from the committed roster.
//! Handlers only ever read [`RosterStore::snapshot`], so a request that
//! races a commit sees either the old or the new generation in full.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use maplewatch_core::{report, RosterError, RosterStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::scheduler::{CycleStats, StatsSnapshot};

/// Upper bound on a single command request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct CommandState {
    pub store: Arc<RosterStore>,
    pub stats: Arc<CycleStats>,
    /// Rows shown by `/rank` when the request does not ask for a count.
    pub report_rows: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler error, rendered as `{"error": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Roster(#[from] RosterError),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Roster(err @ RosterError::ReportRange { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "REPORT_RANGE",
                err.to_string(),
            ),
            AppError::Roster(err) => {
                tracing::error!(error = %err, "Roster error while serving command");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the command router with its middleware stack.
pub fn build_app(state: CommandState) -> Router {
    Router::new()
        .route("/rank", get(rank))
        .route("/ping", get(ping))
        .route("/health", get(health))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RankParams {
    pub rows: Option<usize>,
}

/// `GET /rank` -- the rank table in a code fence, ready to paste into chat.
async fn rank(
    State(state): State<CommandState>,
    Query(params): Query<RankParams>,
) -> AppResult<String> {
    let generation = state.store.snapshot();
    let rows = params.rows.unwrap_or_else(|| {
        if state.report_rows > generation.len() {
            tracing::debug!(
                configured = state.report_rows,
                available = generation.len(),
                "Roster shorter than the default report, showing every character"
            );
        }
        state.report_rows.min(generation.len())
    });
    let table = report::render(&generation, rows)?;
    Ok(format!("```\n{table}\n```\n"))
}

/// `GET /ping` -- liveness echo with the last roster fetch latency.
async fn ping(State(state): State<CommandState>) -> String {
    match state.stats.last_fetch_latency() {
        Some(latency) => format!("Pong! ({}ms)", latency.as_millis()),
        None => "Pong!".to_string(),
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    generation: u64,
    roster_size: usize,
    committed_at: Option<DateTime<Utc>>,
    cycle_open: bool,
    stats: StatsSnapshot,
}

/// `GET /health` -- committed generation and cycle counters.
async fn health(State(state): State<CommandState>) -> Json<HealthResponse> {
    let generation = state.store.snapshot();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        generation: generation.id(),
        roster_size: generation.len(),
        committed_at: generation.committed_at(),
        cycle_open: state.store.cycle_open(),
        stats: state.stats.snapshot(),
    })
}
