//! Migration runner
//!
//! Each pending migration runs in its own `BEGIN IMMEDIATE` transaction
//! together with its `schema_version` row. Already applied migrations are
//! skipped after their recorded checksum is compared with the embedded SQL.

#![allow(clippy::result_large_err)]

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{Migration, MIGRATIONS};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

const SCHEMA_VERSION_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    migration_id TEXT NOT NULL UNIQUE,
    applied_at INTEGER NOT NULL,
    checksum TEXT
)";

/// Bring the database to the latest schema
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    apply_migrations_through(conn, None)
}

/// Apply pending migrations up to and including `last`
///
/// `None` applies everything. Stopping early leaves a database in an older
/// schema, which is how legacy data is reproduced in tests.
pub fn apply_migrations_through(conn: &mut Connection, last: Option<&str>) -> Result<()> {
    conn.execute(SCHEMA_VERSION_DDL, []).map_err(from_rusqlite)?;

    for migration in MIGRATIONS {
        apply_one(conn, migration)?;
        if last == Some(migration.id) {
            break;
        }
    }
    Ok(())
}

fn recorded_checksum(conn: &Connection, migration_id: &str) -> Result<Option<Option<String>>> {
    conn.query_row(
        "SELECT checksum FROM schema_version WHERE migration_id = ?1",
        [migration_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(from_rusqlite)
}

fn apply_one(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let checksum = compute_checksum(migration.sql);

    match recorded_checksum(conn, migration.id)? {
        Some(Some(expected)) if expected != checksum => {
            return Err(checksum_mismatch(migration.id, &expected, &checksum));
        }
        Some(_) => return Ok(()),
        None => {}
    }

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;

    // Another connection may have applied it while we waited for the lock.
    if recorded_checksum(&tx, migration.id)?.is_some() {
        return Ok(());
    }

    if let Some(prepare) = migration.prepare {
        let fixed = prepare(&tx)?;
        tracing::debug!(migration_id = migration.id, fixed, "prepared legacy rows");
    }

    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        params![migration.id, chrono::Utc::now().timestamp_millis(), checksum],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id = migration.id, "applied migration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reapplying_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_stop_after_named_migration() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations_through(&mut conn, Some("001_view_configs")).unwrap();
        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_checksum_drift_is_detected() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute(
            "UPDATE schema_version SET checksum = 'tampered' WHERE migration_id = '002_role_sets'",
            [],
        )
        .unwrap();

        let err = apply_migrations(&mut conn).unwrap_err();
        assert_eq!(err.op(), Some("migration_checksum"));
    }
}
