//! Canonical row selection for duplicated views
//!
//! Rows written before the `(entity_type_id, kind, slug)` uniqueness index
//! existed may share a slug. The oldest row (`created_at`, then lowest id)
//! is the one that survives; the store deletes the rest.

use crate::model::ViewDefinition;

/// Which row survives and which rows are deleted
#[derive(Debug, Clone, PartialEq)]
pub struct DedupPlan {
    pub canonical: ViewDefinition,
    pub redundant: Vec<ViewDefinition>,
}

impl DedupPlan {
    pub fn is_noop(&self) -> bool {
        self.redundant.is_empty()
    }

    /// Union of every row's role set, canonical roles first
    ///
    /// A row with an empty role set was visible to every role, so the union
    /// stays empty if any row had one.
    pub fn merged_roles(&self) -> Vec<String> {
        let rows = std::iter::once(&self.canonical).chain(self.redundant.iter());
        let mut merged: Vec<String> = Vec::new();
        for row in rows {
            if row.roles.is_empty() {
                return Vec::new();
            }
            for role in &row.roles {
                if !merged.contains(role) {
                    merged.push(role.clone());
                }
            }
        }
        merged
    }
}

/// Split rows sharing one slug into the survivor and the rest
///
/// Returns `None` for an empty input.
pub fn plan_dedup(mut rows: Vec<ViewDefinition>) -> Option<DedupPlan> {
    if rows.is_empty() {
        return None;
    }
    rows.sort_by_key(ViewDefinition::age_key);
    let canonical = rows.remove(0);
    Some(DedupPlan {
        canonical,
        redundant: rows,
    })
}
