//! viewcfg Engine - Orchestration layer
//!
//! Provides the operations a request layer calls (list, save, delete and
//! default resolution of views), coordinating between core domain logic and
//! the persistence layer.

#![allow(clippy::result_large_err)]

pub mod commands;

use rusqlite::Connection;
use viewcfg_core::logging_facility;
use viewcfg_store::errors::Result;
use viewcfg_store::{StoreConfig, ViewStore};

/// Initialize logging for the configured profile and open the store
///
/// Returns a migrated connection and a `ViewStore` carrying the
/// configured default and system roles.
pub fn open_store(config: &StoreConfig) -> Result<(Connection, ViewStore)> {
    logging_facility::init(config.log_profile);
    let conn = config.open()?;
    tracing::debug!(path = %config.database_path.display(), "opened view store");
    Ok((conn, ViewStore::new(config)))
}
