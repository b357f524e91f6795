//! SQL migrations compiled into the binary, in application order

#![allow(clippy::result_large_err)]

use crate::dedup::DedupReconciler;
use crate::exclusivity::DefaultExclusivityEnforcer;
use crate::errors::Result;
use rusqlite::Connection;

/// Data fix-up run in the migration's transaction before its SQL
pub type Prepare = fn(&Connection) -> Result<usize>;

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
    pub prepare: Option<Prepare>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        id: "001_view_configs",
        sql: include_str!("../../migrations/001_view_configs.sql"),
        prepare: None,
    },
    Migration {
        id: "002_role_sets",
        sql: include_str!("../../migrations/002_role_sets.sql"),
        prepare: None,
    },
    Migration {
        id: "003_unique_bucket_slug",
        sql: include_str!("../../migrations/003_unique_bucket_slug.sql"),
        prepare: Some(heal_legacy_rows),
    },
];

/// Collapse slug duplicates, which the unique index cannot be built over,
/// then give every shared default role back to its oldest claimant
fn heal_legacy_rows(conn: &Connection) -> Result<usize> {
    let removed = DedupReconciler::reconcile_all(conn)?;
    let repaired = DefaultExclusivityEnforcer::repair_all(conn)?;
    Ok(removed + repaired)
}
