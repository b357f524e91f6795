//! viewcfg Store - SQLite persistence for view configurations
//!
//! Provides:
//! - Connection management tuned for concurrent writers
//! - Embedded, checksummed schema migrations
//! - The row repository for the `view_configs` table
//! - `ViewStore`: get/put/del with duplicate reconciliation and default-role
//!   exclusivity applied inside one immediate transaction

pub mod config;
pub mod db;
mod dedup;
pub mod errors;
mod exclusivity;
pub mod migrations;
pub mod repo;
pub mod view_store;

// Re-export key types
pub use config::StoreConfig;
pub use errors::Result;
pub use view_store::ViewStore;
