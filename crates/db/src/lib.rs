//! Game-server database access.
//!
//! Reads the character roster from the game server's MySQL schema and
//! exposes it through the [`RosterSource`] seam used by the poll scheduler.

use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;

pub mod models;
pub mod repositories;
pub mod source;

pub use source::{MySqlRosterSource, RosterSource, SourceError};

pub type DbPool = sqlx::MySqlPool;

/// The roster poll holds a single connection at a time; a small pool keeps
/// a spare for health checks.
const MAX_CONNECTIONS: u32 = 2;

/// Create a connection pool from a database URL.
///
/// Connections are opened on first use, so an unreachable database at
/// startup surfaces as a failed poll cycle rather than a failed boot.
/// `acquire_timeout` bounds how long a poll waits for a connection.
pub fn create_pool(database_url: &str, acquire_timeout: Duration) -> Result<DbPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
