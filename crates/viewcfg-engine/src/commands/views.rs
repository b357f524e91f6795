//! View command handlers with boundary logging.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for view operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

#![allow(clippy::result_large_err)]

use crate::commands::body::decode_view_body;
use rusqlite::Connection;
use serde_json::Value;
use viewcfg_core::errors::{ExError, ViewError};
use viewcfg_core::model::{EntityType, ViewDefinition, ViewKind};
use viewcfg_core::resolver::Resolution;
use viewcfg_core::{log_op_end, log_op_error, log_op_start, EntityTypeCatalog};
use viewcfg_core_types::RequestContext;
use viewcfg_store::errors::Result;
use viewcfg_store::ViewStore;

fn with_request(err: ExError, op: &str, ctx: &RequestContext) -> ExError {
    let err = if err.op().is_none() { err.with_op(op) } else { err };
    let err = err.with_request_id(ctx.request_id.clone());
    match &ctx.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}

fn require_entity_type(
    catalog: &dyn EntityTypeCatalog,
    entity_type_id: &str,
) -> Result<EntityType> {
    catalog.entity_type(entity_type_id).ok_or_else(|| {
        ExError::from(ViewError::EntityTypeNotFound {
            entity_type_id: entity_type_id.to_string(),
        })
    })
}

/// List the views of an entity type
///
/// `kind: None` lists LIST views then EDITOR views. With a role and
/// without `all`, only views that role may use are returned.
///
/// ## Errors
///
/// - `NotFound`: unknown entity type
/// - `Persistence`: database error
#[allow(clippy::too_many_arguments)]
pub fn list_views(
    catalog: &dyn EntityTypeCatalog,
    store: &ViewStore,
    conn: &Connection,
    ctx: &RequestContext,
    entity_type_id: &str,
    kind: Option<ViewKind>,
    role: Option<&str>,
    all: bool,
) -> Result<Vec<ViewDefinition>> {
    log_op_start!(
        "list_views",
        entity_type_id = entity_type_id,
        request_id = ctx.request_id.as_str()
    );
    let start = std::time::Instant::now();

    let result = list_views_impl(catalog, store, conn, entity_type_id, kind, role, all)
        .map_err(|e| {
            let e = with_request(e, "list_views", ctx);
            log_op_error!(
                "list_views",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "list_views",
        duration_ms = start.elapsed().as_millis() as u64,
        view_count = result.len()
    );

    Ok(result)
}

fn list_views_impl(
    catalog: &dyn EntityTypeCatalog,
    store: &ViewStore,
    conn: &Connection,
    entity_type_id: &str,
    kind: Option<ViewKind>,
    role: Option<&str>,
    all: bool,
) -> Result<Vec<ViewDefinition>> {
    require_entity_type(catalog, entity_type_id)?;

    let kinds: &[ViewKind] = match &kind {
        Some(kind) => std::slice::from_ref(kind),
        None => &ViewKind::ALL,
    };

    let mut views = Vec::new();
    for kind in kinds {
        views.extend(store.get(conn, entity_type_id, *kind, role, all)?);
    }
    Ok(views)
}

/// Save a view from its wire body
///
/// The acting role of `ctx` becomes the view's role set when the body
/// names none.
///
/// ## Errors
///
/// - `NotFound`: unknown entity type, or unknown `previous_slug`
/// - `InvalidInput`: malformed body, missing label, empty payload
/// - `Conflict`: the slug belongs to another view
/// - `Transaction` / `Concurrency`: the write was rolled back; retrying is safe
pub fn save_view(
    catalog: &dyn EntityTypeCatalog,
    store: &ViewStore,
    conn: &mut Connection,
    ctx: &RequestContext,
    entity_type_id: &str,
    kind: ViewKind,
    body: &Value,
) -> Result<ViewDefinition> {
    log_op_start!(
        "save_view",
        entity_type_id = entity_type_id,
        view_kind = kind.as_str(),
        request_id = ctx.request_id.as_str()
    );
    let start = std::time::Instant::now();

    let result = save_view_impl(catalog, store, conn, ctx, entity_type_id, kind, body).map_err(
        |e| {
            let e = with_request(e, "save_view", ctx);
            log_op_error!(
                "save_view",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        },
    )?;

    log_op_end!(
        "save_view",
        duration_ms = start.elapsed().as_millis() as u64,
        slug = result.slug.as_str()
    );

    Ok(result)
}

fn save_view_impl(
    catalog: &dyn EntityTypeCatalog,
    store: &ViewStore,
    conn: &mut Connection,
    ctx: &RequestContext,
    entity_type_id: &str,
    kind: ViewKind,
    body: &Value,
) -> Result<ViewDefinition> {
    require_entity_type(catalog, entity_type_id)?;
    let draft = decode_view_body(entity_type_id, kind, body)?;
    store.put(conn, &draft, ctx.acting_role())
}

/// Delete a view, or only `role`'s access to it
///
/// Deleting an absent view is not an error; the result tells whether
/// anything changed.
///
/// ## Errors
///
/// - `NotFound`: unknown entity type
/// - `Transaction` / `Concurrency`: the delete was rolled back
#[allow(clippy::too_many_arguments)]
pub fn delete_view(
    catalog: &dyn EntityTypeCatalog,
    store: &ViewStore,
    conn: &mut Connection,
    ctx: &RequestContext,
    entity_type_id: &str,
    kind: ViewKind,
    slug: &str,
    role: Option<&str>,
) -> Result<bool> {
    log_op_start!(
        "delete_view",
        entity_type_id = entity_type_id,
        view_kind = kind.as_str(),
        slug = slug,
        request_id = ctx.request_id.as_str()
    );
    let start = std::time::Instant::now();

    let result = require_entity_type(catalog, entity_type_id)
        .and_then(|_| store.del(conn, entity_type_id, kind, slug, role))
        .map_err(|e| {
            let e = with_request(e, "delete_view", ctx).with_slug(slug);
            log_op_error!(
                "delete_view",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "delete_view",
        duration_ms = start.elapsed().as_millis() as u64,
        removed = result
    );

    Ok(result)
}

/// Resolve the view `role` gets when it has not picked one
///
/// Never fails for an empty bucket: a built-in view is synthesized from the
/// entity type's field catalog.
///
/// ## Errors
///
/// - `NotFound`: unknown entity type
/// - `Persistence`: database error
pub fn resolve_default_view(
    catalog: &dyn EntityTypeCatalog,
    store: &ViewStore,
    conn: &Connection,
    ctx: &RequestContext,
    entity_type_id: &str,
    kind: ViewKind,
    role: &str,
) -> Result<Resolution> {
    log_op_start!(
        "resolve_default_view",
        entity_type_id = entity_type_id,
        view_kind = kind.as_str(),
        role = role,
        request_id = ctx.request_id.as_str()
    );
    let start = std::time::Instant::now();

    let result = require_entity_type(catalog, entity_type_id)
        .and_then(|entity_type| {
            store.resolve_default(conn, entity_type_id, kind, role, Some(&entity_type))
        })
        .map_err(|e| {
            let e = with_request(e, "resolve_default_view", ctx);
            log_op_error!(
                "resolve_default_view",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "resolve_default_view",
        duration_ms = start.elapsed().as_millis() as u64,
        slug = result.view.slug.as_str(),
        tier = ?result.tier
    );

    Ok(result)
}
