//! viewcfg Core - role-scoped view configuration kernel
//!
//! This crate provides the storage-independent half of the view
//! configuration store:
//! - View definitions (LIST column sets, EDITOR section layouts) and the
//!   external entity-type catalog they describe
//! - Role normalization and slug allocation for the single write path
//! - Duplicate-row canonical selection and default-role exclusivity planning
//! - The default-view resolution chain with its built-in fallback
//! - The structured error and logging facilities shared by every layer

pub mod catalog;
pub mod dedup;
pub mod errors;
pub mod exclusivity;
pub mod logging_facility;
pub mod model;
pub mod resolver;
pub mod rules;

// Used by the logging macros so dependents don't need a direct dependency.
#[doc(hidden)]
pub use viewcfg_core_types as core_types;

// Re-export commonly used types
pub use catalog::{EntityTypeCatalog, InMemoryCatalog};
pub use errors::{ExError, ExErrorKind, Result, ViewError};
pub use model::{
    EditorSection, EntityType, FieldDef, FieldType, ListColumn, ViewDefinition, ViewDraft,
    ViewId, ViewKind, ViewPayload,
};
pub use resolver::{resolve_default, Resolution, ResolutionTier};
