//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Default wait for a competing writer before giving up with a busy error
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection for concurrent writers
///
/// In-memory databases report `memory` for the journal mode; that is fine.
pub fn configure(conn: &Connection, busy_timeout_ms: u64) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(from_rusqlite)?;
    tracing::debug!(journal_mode = %mode, "configured sqlite connection");

    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(from_rusqlite)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_file_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open(dir.path().join("views.db")).unwrap();
        configure(&conn, 100).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |r| r.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_configure_in_memory() {
        let conn = open_in_memory().unwrap();
        configure(&conn, DEFAULT_BUSY_TIMEOUT_MS).unwrap();
    }
}
