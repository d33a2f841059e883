#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report store backed by `SQLite`.
//!
//! One row per submitted rating, stored in `data/reports.db` by default.
//! Uses `switchy_database` for all database operations. The backing store
//! is treated as a plain document collection: insert, point lookup, and
//! filtered scans. There is no delete path.
//!
//! Timestamps are stored as epoch milliseconds and surface as
//! `chrono::DateTime<Utc>` everywhere in process.

pub mod queries;

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;
use thiserror::Error;

/// Default path for the reports database.
pub const DEFAULT_DB_PATH: &str = "data/reports.db";

/// Errors from report store operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored value could not be converted to its in-process type.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Opens (or creates) the reports `SQLite` database and ensures the schema
/// exists.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Database(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Opens an in-memory reports database with the schema applied.
///
/// Used by tests and local development; nothing is persisted.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open_in_memory() -> Result<Box<dyn Database>, DbError> {
    let db = init_sqlite_rusqlite(None).map_err(|e| DbError::Database(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Creates the `reports` table and its indexes if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS reports (
            id           TEXT PRIMARY KEY,
            submitter_id TEXT NOT NULL,
            address      TEXT NOT NULL,
            address_key  TEXT NOT NULL,
            score        INTEGER NOT NULL,
            noise_types  TEXT NOT NULL,
            created_at   INTEGER NOT NULL,
            lat          REAL,
            lng          REAL
        )",
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_reports_address_key
         ON reports (address_key)",
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_reports_submitter
         ON reports (submitter_id, created_at)",
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_reports_created
         ON reports (created_at)",
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    log::debug!("Report store schema ensured");

    Ok(())
}
