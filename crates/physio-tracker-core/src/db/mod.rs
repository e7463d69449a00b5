//! Database layer for the physio tracker.
//!
//! [`Database`] is the record store. Reads run directly against the
//! connection; every mutation is staged in a [`ChangeSet`] and applied by
//! [`Database::persist`] inside a single transaction, so a failed write
//! never leaves part of a batch behind.

mod changes;
mod patients;
mod progress;
mod schema;

pub use changes::*;
pub use schema::*;

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::search;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// The store could not be opened or initialized.
    #[error("Store unavailable at {path}: {reason}")]
    StoreUnavailable { path: String, reason: String },

    /// A batch of changes could not be committed. Nothing was applied.
    #[error("Persistence failure while applying {change}: {source}")]
    PersistenceFailure {
        change: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A mutation targeted a record that does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl DbError {
    fn unavailable(path: &str, reason: impl std::fmt::Display) -> Self {
        DbError::StoreUnavailable {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::PersistenceFailure { .. })
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Tunables applied when opening a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// How long a write waits on a locked database file.
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5_000),
        }
    }
}

/// Outcome of [`Database::reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResetSummary {
    /// Tables emptied, with the number of rows removed
    pub cleared: Vec<(String, usize)>,
    /// Tables that could not be emptied, with the error message
    pub failed: Vec<(String, String)>,
}

impl ResetSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::open_with_options(path, &StoreOptions::default())
    }

    /// Open database at path with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &StoreOptions) -> DbResult<Self> {
        let shown = path.as_ref().display().to_string();
        let conn = Connection::open(path.as_ref()).map_err(|e| DbError::unavailable(&shown, e))?;
        let db = Self::initialize(conn, options, &shown)?;
        info!(path = %shown, "opened patient store");
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::unavailable(":memory:", e))?;
        Self::initialize(conn, &StoreOptions::default(), ":memory:")
    }

    /// Configure the connection and bring the schema up to date.
    fn initialize(conn: Connection, options: &StoreOptions, path: &str) -> DbResult<Self> {
        conn.busy_timeout(options.busy_timeout)
            .map_err(|e| DbError::unavailable(path, e))?;
        search::register_functions(&conn).map_err(|e| DbError::unavailable(path, e))?;

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|e| DbError::unavailable(path, e))?;
        if version > SCHEMA_VERSION {
            return Err(DbError::unavailable(
                path,
                format!(
                    "schema version {} is newer than supported version {}",
                    version, SCHEMA_VERSION
                ),
            ));
        }

        conn.execute_batch(SCHEMA)
            .map_err(|e| DbError::unavailable(path, e))?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|e| DbError::unavailable(path, e))?;

        Ok(Self { conn })
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Apply every staged change in one transaction.
    ///
    /// Returns the number of rows written. An empty change set is a no-op.
    /// On error the transaction is rolled back and `changes` is left
    /// untouched so the caller can retry it.
    pub fn persist(&mut self, changes: &mut ChangeSet) -> DbResult<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|source| DbError::PersistenceFailure {
                change: "begin transaction".into(),
                source,
            })?;

        let mut rows = 0;
        for change in changes.iter() {
            rows += change.apply(&tx)?;
        }

        tx.commit().map_err(|source| DbError::PersistenceFailure {
            change: "commit".into(),
            source,
        })?;

        debug!(changes = changes.len(), rows, "persisted change set");
        changes.clear();
        Ok(rows)
    }

    /// Stage changes through `stage` and persist them atomically.
    pub fn transaction<T, F>(&mut self, stage: F) -> DbResult<T>
    where
        F: FnOnce(&mut ChangeSet) -> T,
    {
        let mut changes = ChangeSet::new();
        let staged = stage(&mut changes);
        self.persist(&mut changes)?;
        Ok(staged)
    }

    /// Delete every record of every type.
    ///
    /// Each table is cleared independently; a failure is logged and
    /// reported in the summary without stopping the remaining tables.
    pub fn reset(&mut self) -> ResetSummary {
        let mut summary = ResetSummary::default();
        for table in TABLES {
            match self.conn.execute(&format!("DELETE FROM {}", table), []) {
                Ok(rows) => summary.cleared.push((table.to_string(), rows)),
                Err(e) => {
                    warn!(table, error = %e, "failed to reset table");
                    summary.failed.push((table.to_string(), e.to_string()));
                }
            }
        }
        info!(cleared = summary.cleared.len(), failed = summary.failed.len(), "store reset");
        summary
    }
}

/// Fixed-width RFC 3339 so lexical order matches chronological order.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
