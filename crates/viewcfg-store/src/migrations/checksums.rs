//! Checksum validation for migrations
//!
//! A recorded checksum that no longer matches the embedded SQL means the
//! migration was edited after it was applied.

use sha2::{Digest, Sha256};

/// SHA-256 of migration SQL, hex encoded
///
/// Line endings are normalized first so a CRLF checkout hashes the same.
pub fn compute_checksum(sql: &str) -> String {
    let normalized = sql.replace("\r\n", "\n");
    hex::encode(Sha256::digest(normalized.as_bytes()))
}
