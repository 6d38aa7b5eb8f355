//! The roster data-source seam.
//!
//! [`RosterSource`] is what the poll scheduler calls once per cycle. The
//! production implementation, [`MySqlRosterSource`], reads the game
//! server's database; tests substitute in-memory fakes.

use async_trait::async_trait;
use maplewatch_core::Character;

use crate::repositories::CharacterRepo;
use crate::DbPool;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure to obtain a complete roster. Always aborts the current cycle.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The query failed (connection, timeout, SQL or decode error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row decoded but holds values outside the record's domain.
    #[error("Invalid row for character {name}: {reason}")]
    InvalidRow { name: String, reason: String },

    /// The source is not able to serve a roster right now, e.g. its pool
    /// has been closed during shutdown.
    #[error("Roster source unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// RosterSource
// ---------------------------------------------------------------------------

/// Supplies one full roster per call, in a stable order, names unique.
///
/// A previously seen name that is missing from the result is treated as
/// dropped by the caller.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Character>, SourceError>;
}

// ---------------------------------------------------------------------------
// MySqlRosterSource
// ---------------------------------------------------------------------------

/// Reads the roster from the game server's `characters` table.
pub struct MySqlRosterSource {
    pool: DbPool,
    /// Names never reported (staff and test accounts).
    excluded: Vec<String>,
}

impl MySqlRosterSource {
    pub fn new(pool: DbPool, excluded: Vec<String>) -> Self {
        Self { pool, excluded }
    }
}

#[async_trait]
impl RosterSource for MySqlRosterSource {
    async fn fetch(&self) -> Result<Vec<Character>, SourceError> {
        if self.pool.is_closed() {
            return Err(SourceError::Unavailable("connection pool is closed".into()));
        }
        let rows = CharacterRepo::list_roster(&self.pool, &self.excluded).await?;
        tracing::debug!(rows = rows.len(), "Fetched roster rows");
        rows.into_iter().map(Character::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn closed_pool_reports_unavailable() {
        let pool = crate::create_pool("mysql://maple@127.0.0.1:9/maple", Duration::from_secs(1))
            .unwrap();
        pool.close().await;

        let source = MySqlRosterSource::new(pool, vec!["Admin".into()]);
        assert_matches!(source.fetch().await, Err(SourceError::Unavailable(_)));
    }

    #[test]
    fn source_error_display_invalid_row() {
        let err = SourceError::InvalidRow {
            name: "Alice".into(),
            reason: "level -1 is out of range".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid row for character Alice: level -1 is out of range"
        );
    }

    #[test]
    fn source_error_from_sqlx() {
        let err: SourceError = sqlx::Error::PoolTimedOut.into();
        assert!(err.to_string().starts_with("Database error"));
    }
}
