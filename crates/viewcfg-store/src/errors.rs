//! Error handling for viewcfg-store
//!
//! Wraps viewcfg-core ExError with store-specific helpers

use rusqlite::ErrorCode;
use viewcfg_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
///
/// Busy/locked databases are reported as `Concurrency` and unique-index
/// violations as `Conflict`; everything else is `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            ExErrorKind::Concurrency
        }
        Some(ErrorCode::ConstraintViolation) => ExErrorKind::Conflict,
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an error for a transaction that could not begin or commit
pub fn transaction_error(op: &str, err: rusqlite::Error) -> ExError {
    let kind = match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            ExErrorKind::Concurrency
        }
        _ => ExErrorKind::Transaction,
    };
    ExError::new(kind)
        .with_op(op.to_string())
        .with_message(format!("transaction aborted: {}", err))
}

/// Create an error for a stored JSON column that no longer decodes
pub fn corrupt_row(column: &str, id: i64, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("decode_row")
        .with_message(format!("view {} has unreadable {}: {}", id, column, reason))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a configuration parse error
pub fn config_error(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("load_config")
        .with_message(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_maps_to_concurrency() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        let ex = from_rusqlite(err);
        assert_eq!(ex.kind(), ExErrorKind::Concurrency);
        assert!(ex.is_retryable());
    }

    #[test]
    fn test_constraint_maps_to_conflict() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("UNIQUE constraint failed".to_string()),
        );
        assert_eq!(from_rusqlite(err).kind(), ExErrorKind::Conflict);
    }

    #[test]
    fn test_commit_failure_is_transaction_error() {
        let ex = transaction_error("put_view", rusqlite::Error::InvalidQuery);
        assert_eq!(ex.kind(), ExErrorKind::Transaction);
        assert_eq!(ex.op(), Some("put_view"));
    }
}
