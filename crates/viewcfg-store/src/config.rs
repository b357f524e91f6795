//! Store configuration
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration.

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::{config_error, io_error, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use viewcfg_core::logging_facility::Profile;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    /// Role given to a view saved without roles and without an acting role
    pub default_role: String,
    /// Role that sees every view in listings; never written into role sets
    pub system_role: Option<String>,
    pub busy_timeout_ms: u64,
    pub log_profile: Profile,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("viewcfg.db"),
            default_role: "ADMIN".to_string(),
            system_role: None,
            busy_timeout_ms: db::DEFAULT_BUSY_TIMEOUT_MS,
            log_profile: Profile::Development,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| config_error(&e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| io_error("load_config", e))?;
        Self::from_toml_str(&text)
    }

    /// Open, configure and migrate the configured database
    pub fn open(&self) -> Result<Connection> {
        let mut conn = db::open(&self.database_path)?;
        db::configure(&conn, self.busy_timeout_ms)?;
        apply_migrations(&mut conn)?;
        Ok(conn)
    }
}
