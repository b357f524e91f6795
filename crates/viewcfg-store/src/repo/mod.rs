//! Repository layer for persisting view configurations to SQLite

pub mod sqlite_repo;

pub use sqlite_repo::ViewRepo;
