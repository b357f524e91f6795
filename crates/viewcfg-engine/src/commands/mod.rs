//! Command orchestration layer.
//!
//! Provides the outward view operations, coordinating between the domain
//! kernel, the entity-type catalog and the persistence layer.

pub mod body;
pub mod view_command;
pub mod views;

pub use view_command::{apply_view_command, ViewCommand, ViewCommandResult};
pub use views::{delete_view, list_views, resolve_default_view, save_view};
