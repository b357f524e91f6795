//! Engine-level view commands.

#![allow(clippy::result_large_err)]

use crate::commands::views::{delete_view, save_view};
use rusqlite::Connection;
use serde_json::Value;
use viewcfg_core::model::{ViewDefinition, ViewKind};
use viewcfg_core::EntityTypeCatalog;
use viewcfg_core_types::RequestContext;
use viewcfg_store::errors::Result;
use viewcfg_store::ViewStore;

/// View mutations that require I/O.
#[derive(Debug, Clone)]
pub enum ViewCommand {
    /// Create or update a view from its wire body.
    Save {
        entity_type_id: String,
        kind: ViewKind,
        body: Value,
    },
    /// Delete a view, or one role's access to it.
    Delete {
        entity_type_id: String,
        kind: ViewKind,
        slug: String,
        role: Option<String>,
    },
}

/// Result of applying a view command.
#[derive(Debug, Clone)]
pub enum ViewCommandResult {
    Saved(ViewDefinition),
    /// `removed` is false when there was nothing to delete.
    Deleted { removed: bool },
}

/// Apply a view command.
pub fn apply_view_command(
    cmd: ViewCommand,
    catalog: &dyn EntityTypeCatalog,
    store: &ViewStore,
    conn: &mut Connection,
    ctx: &RequestContext,
) -> Result<ViewCommandResult> {
    match cmd {
        ViewCommand::Save {
            entity_type_id,
            kind,
            body,
        } => {
            let view = save_view(catalog, store, conn, ctx, &entity_type_id, kind, &body)?;
            Ok(ViewCommandResult::Saved(view))
        }
        ViewCommand::Delete {
            entity_type_id,
            kind,
            slug,
            role,
        } => {
            let removed = delete_view(
                catalog,
                store,
                conn,
                ctx,
                &entity_type_id,
                kind,
                &slug,
                role.as_deref(),
            )?;
            Ok(ViewCommandResult::Deleted { removed })
        }
    }
}
