//! Schema migrations
//!
//! Embedded, checksummed and applied at most once per database.

mod checksums;
mod embedded;
mod runner;

pub use runner::{apply_migrations, apply_migrations_through};
