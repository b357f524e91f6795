//! Duplicate-row reconciliation
//!
//! Collapses rows sharing `(entity_type_id, kind, slug)` down to the
//! canonical one picked by `viewcfg_core::dedup::plan_dedup`. Runs inside
//! the caller's transaction.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo::ViewRepo;
use rusqlite::Connection;
use viewcfg_core::dedup::plan_dedup;
use viewcfg_core::model::{now_millis, ViewDefinition};

pub(crate) struct DedupReconciler;

impl DedupReconciler {
    /// Keep the canonical row of `rows` and delete the others
    ///
    /// Returns `None` when `rows` is empty.
    pub(crate) fn reconcile(
        conn: &Connection,
        rows: Vec<ViewDefinition>,
    ) -> Result<Option<ViewDefinition>> {
        let Some(plan) = plan_dedup(rows) else {
            return Ok(None);
        };

        for row in &plan.redundant {
            if let Some(id) = row.id {
                ViewRepo::delete_by_id(conn, id)?;
            }
        }
        if !plan.is_noop() {
            tracing::debug!(
                slug = %plan.canonical.slug,
                kept = ?plan.canonical.id,
                removed = plan.redundant.len(),
                "reconciled duplicate view rows"
            );
        }

        Ok(Some(plan.canonical))
    }

    /// Collapse every duplicated identity key in the table
    ///
    /// Role sets of the removed rows are merged into the survivor so no role
    /// loses access. Their default roles move to the survivor too unless
    /// another view of the bucket already claims them. Returns the number
    /// of rows removed.
    pub(crate) fn reconcile_all(conn: &Connection) -> Result<usize> {
        let mut removed = 0;
        for (entity_type_id, kind, slug) in ViewRepo::duplicate_keys(conn)? {
            let rows = ViewRepo::find_by_slug(conn, &entity_type_id, kind, &slug)?;
            let Some(plan) = plan_dedup(rows) else {
                continue;
            };

            let merged = plan.merged_roles();
            let claimed_elsewhere: Vec<String> = ViewRepo::list_bucket(conn, &entity_type_id, kind)?
                .into_iter()
                .filter(|view| view.slug != slug)
                .flat_map(|view| view.default_roles)
                .collect();

            let mut defaults = plan.canonical.default_roles.clone();
            let mut dropped = Vec::new();
            for role in plan.redundant.iter().flat_map(|row| &row.default_roles) {
                if defaults.contains(role) {
                    continue;
                }
                let permitted = merged.is_empty() || merged.contains(role);
                if permitted && !claimed_elsewhere.contains(role) {
                    defaults.push(role.clone());
                } else if !dropped.contains(role) {
                    dropped.push(role.clone());
                }
            }
            if !dropped.is_empty() {
                tracing::debug!(
                    entity_type_id = %entity_type_id,
                    kind = %kind,
                    slug = %slug,
                    dropped = ?dropped,
                    "default roles of duplicate rows already claimed in bucket"
                );
            }

            for row in &plan.redundant {
                if let Some(id) = row.id {
                    removed += ViewRepo::delete_by_id(conn, id)?;
                }
            }

            if let Some(id) = plan.canonical.id {
                if merged != plan.canonical.roles || defaults != plan.canonical.default_roles {
                    ViewRepo::update_roles(conn, id, &merged, &defaults, now_millis())?;
                }
            }
        }
        Ok(removed)
    }
}
