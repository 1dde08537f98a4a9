//! Repository layer for SQLite persistence.
//!
//! Each repository opens a short-lived connection per operation against the
//! same database file, so repositories can be created freely and shared
//! across the scan pipeline and the CLI.

mod document;
mod tag;

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;

pub use document::DocumentRepository;
pub use tag::TagRepository;

/// Storage format for floating wall-clock dates.
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Open a connection, creating parent directories as needed.
pub fn connect(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(conn)
}

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Format a floating date for storage.
pub fn format_naive(dt: &NaiveDateTime) -> String {
    dt.format(NAIVE_DATETIME_FORMAT).to_string()
}

/// Parse an optional floating date from the database.
pub fn parse_naive_opt(s: Option<String>) -> Option<NaiveDateTime> {
    s.and_then(|s| NaiveDateTime::parse_from_str(&s, NAIVE_DATETIME_FORMAT).ok())
}
