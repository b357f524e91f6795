//! View store
//!
//! The persistent repository for view definitions. `put` and `del` each run
//! in one `BEGIN IMMEDIATE` transaction, so the slug check, duplicate
//! reconciliation, default-role release and upsert commit together or not
//! at all. Reads run outside any transaction.

#![allow(clippy::result_large_err)]

use crate::config::StoreConfig;
use crate::dedup::DedupReconciler;
use crate::errors::{transaction_error, Result};
use crate::exclusivity::DefaultExclusivityEnforcer;
use crate::repo::ViewRepo;
use rusqlite::{Connection, TransactionBehavior};
use viewcfg_core::errors::{ExError, ExErrorKind, ViewError};
use viewcfg_core::model::{now_millis, EntityType, ViewDefinition, ViewDraft, ViewKind};
use viewcfg_core::resolver::{self, Resolution};
use viewcfg_core::rules::{
    allocate, normalize_role, normalize_roles, slugify, validate_draft, NormalizedRoles,
};

#[derive(Debug, Clone)]
pub struct ViewStore {
    default_role: String,
    system_role: Option<String>,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

impl ViewStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            default_role: normalize_role(&config.default_role).unwrap_or_else(|| "ADMIN".to_string()),
            system_role: config.system_role.as_deref().and_then(normalize_role),
        }
    }

    /// Role assigned when a save names no roles and has no acting role
    pub fn default_role(&self) -> &str {
        &self.default_role
    }

    fn sees_everything(&self, role: &str) -> bool {
        self.system_role.as_deref() == Some(role)
    }

    /// List the views of a bucket, oldest first
    ///
    /// With `include_all` or without a role every view is returned.
    /// Otherwise only views whose role set contains `role` (or is empty).
    pub fn get(
        &self,
        conn: &Connection,
        entity_type_id: &str,
        kind: ViewKind,
        role: Option<&str>,
        include_all: bool,
    ) -> Result<Vec<ViewDefinition>> {
        let views = ViewRepo::list_bucket(conn, entity_type_id, kind)?;
        match role.and_then(normalize_role) {
            Some(role) if !include_all && !self.sees_everything(&role) => Ok(views
                .into_iter()
                .filter(|v| v.is_visible_to(&role))
                .collect()),
            _ => Ok(views),
        }
    }

    /// Create or update a view
    ///
    /// The row to update is found by `draft.previous_slug` when renaming,
    /// otherwise by the explicit slug. A draft with neither is a create and
    /// derives its slug from the label.
    pub fn put(
        &self,
        conn: &mut Connection,
        draft: &ViewDraft,
        acting_role: Option<&str>,
    ) -> Result<ViewDefinition> {
        let entity_type_id = draft.entity_type_id.as_str();
        let kind = draft.kind();
        let context = |err: ViewError| {
            ExError::from(err)
                .with_op("put_view")
                .with_entity_type_id(entity_type_id)
                .with_view_kind(kind.as_str())
        };

        validate_draft(draft).map_err(context)?;

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| transaction_error("put_view", e))?;

        let explicit = draft.slug.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let previous = draft
            .previous_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let existing = ViewRepo::bucket_slugs(&tx, entity_type_id, kind)?;
        if let Some(previous) = previous {
            if !existing.iter().any(|s| s == previous) {
                return Err(context(ViewError::ViewNotFound {
                    entity_type_id: entity_type_id.to_string(),
                    kind: kind.to_string(),
                    slug: previous.to_string(),
                }));
            }
        }

        let normalized = normalize_roles(
            draft.roles.as_deref(),
            draft.default_roles.as_deref(),
            acting_role,
            &self.default_role,
        );

        // A derived slug owned by a view with exactly this content is a retry
        // of a committed save, not a collision.
        let retried = match (explicit, previous) {
            (None, None) => Self::identical_view_slug(&tx, draft, &normalized)?,
            _ => None,
        };

        // A rename without a new slug keeps the current one.
        let slug = allocate(
            &existing,
            &draft.label,
            explicit.or(previous),
            previous.or(explicit).or(retried.as_deref()),
        )
        .map_err(context)?;
        let lookup = previous.unwrap_or(slug.as_str());

        DefaultExclusivityEnforcer::enforce(
            &tx,
            entity_type_id,
            kind,
            lookup,
            &normalized.default_roles,
        )?;

        let rows = ViewRepo::find_by_slug(&tx, entity_type_id, kind, lookup)?;
        let canonical = DedupReconciler::reconcile(&tx, rows)?;

        let now = now_millis();
        let mut view = ViewDefinition {
            id: None,
            entity_type_id: entity_type_id.to_string(),
            kind,
            slug,
            label: draft.label.trim().to_string(),
            legacy_default: !normalized.default_roles.is_empty(),
            roles: normalized.roles,
            default_roles: normalized.default_roles,
            payload: draft.payload.clone(),
            created_at: now,
            updated_at: now,
        };

        let id = match canonical.and_then(|row| row.id.map(|id| (id, row.created_at))) {
            Some((id, created_at)) => {
                view.created_at = created_at;
                ViewRepo::update_view(&tx, id, &view)?;
                id
            }
            None => ViewRepo::insert_view(&tx, &view)?,
        };

        let stored = ViewRepo::get_view(&tx, id)?.ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("put_view")
                .with_slug(view.slug.clone())
                .with_message("saved view vanished before commit")
        })?;

        tx.commit().map_err(|e| transaction_error("put_view", e))?;
        tracing::debug!(
            entity_type_id,
            kind = %kind,
            slug = %stored.slug,
            id,
            "stored view"
        );

        Ok(stored)
    }

    /// Slug derived from `draft`'s label, if a stored view under it already
    /// holds exactly what `draft` would write
    fn identical_view_slug(
        conn: &Connection,
        draft: &ViewDraft,
        normalized: &NormalizedRoles,
    ) -> Result<Option<String>> {
        let slug = slugify(&draft.label);
        if slug.is_empty() {
            return Ok(None);
        }
        let rows = ViewRepo::find_by_slug(conn, &draft.entity_type_id, draft.kind(), &slug)?;
        let identical = rows.iter().any(|row| {
            row.label == draft.label.trim()
                && row.roles == normalized.roles
                && row.default_roles == normalized.default_roles
                && row.payload == draft.payload
        });
        Ok(identical.then_some(slug))
    }

    /// Delete a view, or one role's access to it
    ///
    /// Without a role every row of the slug is removed. With a role only
    /// that role's membership (and default) is removed; a view left with no
    /// roles is deleted. Views open to every role have no membership to
    /// remove and are left alone. Returns whether anything changed.
    pub fn del(
        &self,
        conn: &mut Connection,
        entity_type_id: &str,
        kind: ViewKind,
        slug: &str,
        role: Option<&str>,
    ) -> Result<bool> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| transaction_error("delete_view", e))?;

        let changed = match role.and_then(normalize_role) {
            None => ViewRepo::delete_by_slug(&tx, entity_type_id, kind, slug)? > 0,
            Some(role) => {
                let mut changed = false;
                for row in ViewRepo::find_by_slug(&tx, entity_type_id, kind, slug)? {
                    let Some(id) = row.id else { continue };
                    if !row.roles.contains(&role) {
                        continue;
                    }
                    let roles: Vec<String> =
                        row.roles.into_iter().filter(|r| *r != role).collect();
                    let default_roles: Vec<String> =
                        row.default_roles.into_iter().filter(|r| *r != role).collect();
                    if roles.is_empty() {
                        ViewRepo::delete_by_id(&tx, id)?;
                    } else {
                        ViewRepo::update_roles(&tx, id, &roles, &default_roles, now_millis())?;
                    }
                    changed = true;
                }
                changed
            }
        };

        tx.commit().map_err(|e| transaction_error("delete_view", e))?;
        Ok(changed)
    }

    /// Resolve the view `role` sees by default
    pub fn resolve_default(
        &self,
        conn: &Connection,
        entity_type_id: &str,
        kind: ViewKind,
        role: &str,
        entity_type: Option<&EntityType>,
    ) -> Result<Resolution> {
        let bucket = ViewRepo::list_bucket(conn, entity_type_id, kind)?;
        Ok(resolver::resolve_default(
            &bucket,
            entity_type_id,
            kind,
            role,
            entity_type,
        ))
    }
}
