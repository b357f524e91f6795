//! Pure rules applied on the single write path
//!
//! - Role-set normalization
//! - Slug derivation and collision checks
//! - Draft validation

pub mod roles;
pub mod slug;
pub mod validation;

pub use roles::{normalize_role, normalize_roles, NormalizedRoles};
pub use slug::{allocate, slugify};
pub use validation::validate_draft;
