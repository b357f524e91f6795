//! SQLite repository implementation
//!
//! Row-level access to the `view_configs` table. Every function takes a
//! `&Connection`, so callers inside a transaction pass the transaction.

#![allow(clippy::result_large_err)]

use crate::errors::{corrupt_row, from_rusqlite, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use viewcfg_core::model::{ViewDefinition, ViewId, ViewKind, ViewPayload};

const VIEW_COLUMNS: &str = "id, entity_type_id, kind, slug, label, roles_json, \
     default_roles_json, is_default, payload_json, created_at, updated_at";

/// A `view_configs` row before its JSON columns are decoded
struct RawViewRow {
    id: ViewId,
    entity_type_id: String,
    kind: String,
    slug: String,
    label: String,
    roles_json: String,
    default_roles_json: String,
    is_default: i64,
    payload_json: String,
    created_at: i64,
    updated_at: i64,
}

impl RawViewRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            entity_type_id: row.get(1)?,
            kind: row.get(2)?,
            slug: row.get(3)?,
            label: row.get(4)?,
            roles_json: row.get(5)?,
            default_roles_json: row.get(6)?,
            is_default: row.get(7)?,
            payload_json: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn decode(self) -> Result<ViewDefinition> {
        let id = self.id;
        let kind: ViewKind = self
            .kind
            .parse()
            .map_err(|e: viewcfg_core::ViewError| corrupt_row("kind", id, &e.to_string()))?;
        let roles = decode_roles("roles_json", id, &self.roles_json)?;
        let default_roles = decode_roles("default_roles_json", id, &self.default_roles_json)?;
        let payload = ViewPayload::from_json(kind, &self.payload_json)
            .map_err(|e| corrupt_row("payload_json", id, &e.to_string()))?;

        Ok(ViewDefinition {
            id: Some(id),
            entity_type_id: self.entity_type_id,
            kind,
            slug: self.slug,
            label: self.label,
            roles,
            default_roles,
            payload,
            legacy_default: self.is_default != 0,
            created_at: from_millis(self.created_at),
            updated_at: from_millis(self.updated_at),
        })
    }
}

fn decode_roles(column: &str, id: ViewId, json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json).map_err(|e| corrupt_row(column, id, &e.to_string()))
}

fn encode_roles(roles: &[String]) -> String {
    serde_json::Value::from(roles.to_vec()).to_string()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// SQLite repository for view configurations
pub struct ViewRepo;

impl ViewRepo {
    fn query_views(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<ViewDefinition>> {
        let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
        let raw = stmt
            .query_map(params, RawViewRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        raw.into_iter().map(RawViewRow::decode).collect()
    }

    /// Every view of a bucket, oldest first
    pub fn list_bucket(
        conn: &Connection,
        entity_type_id: &str,
        kind: ViewKind,
    ) -> Result<Vec<ViewDefinition>> {
        let sql = format!(
            "SELECT {} FROM view_configs WHERE entity_type_id = ?1 AND kind = ?2
             ORDER BY created_at, id",
            VIEW_COLUMNS
        );
        Self::query_views(conn, &sql, rusqlite::params![entity_type_id, kind.as_str()])
    }

    /// Distinct slugs of a bucket
    pub fn bucket_slugs(conn: &Connection, entity_type_id: &str, kind: ViewKind) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT slug FROM view_configs
                 WHERE entity_type_id = ?1 AND kind = ?2 ORDER BY slug",
            )
            .map_err(from_rusqlite)?;
        let slugs = stmt
            .query_map(rusqlite::params![entity_type_id, kind.as_str()], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(slugs)
    }

    /// All rows sharing a slug, oldest first (more than one only on legacy data)
    pub fn find_by_slug(
        conn: &Connection,
        entity_type_id: &str,
        kind: ViewKind,
        slug: &str,
    ) -> Result<Vec<ViewDefinition>> {
        let sql = format!(
            "SELECT {} FROM view_configs
             WHERE entity_type_id = ?1 AND kind = ?2 AND slug = ?3
             ORDER BY created_at, id",
            VIEW_COLUMNS
        );
        Self::query_views(
            conn,
            &sql,
            rusqlite::params![entity_type_id, kind.as_str(), slug],
        )
    }

    pub fn get_view(conn: &Connection, id: ViewId) -> Result<Option<ViewDefinition>> {
        let sql = format!("SELECT {} FROM view_configs WHERE id = ?1", VIEW_COLUMNS);
        let raw = conn
            .query_row(&sql, [id], RawViewRow::from_row)
            .optional()
            .map_err(from_rusqlite)?;
        raw.map(RawViewRow::decode).transpose()
    }

    /// Insert a new view and return its id
    pub fn insert_view(conn: &Connection, view: &ViewDefinition) -> Result<ViewId> {
        conn.execute(
            "INSERT INTO view_configs
                (entity_type_id, kind, slug, label, roles_json, default_roles_json,
                 is_default, payload_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                view.entity_type_id,
                view.kind.as_str(),
                view.slug,
                view.label,
                encode_roles(&view.roles),
                encode_roles(&view.default_roles),
                view.legacy_default,
                view.payload.to_json().to_string(),
                view.created_at.timestamp_millis(),
                view.updated_at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(conn.last_insert_rowid())
    }

    /// Overwrite the mutable columns of an existing view
    ///
    /// `created_at` is never changed.
    pub fn update_view(conn: &Connection, id: ViewId, view: &ViewDefinition) -> Result<()> {
        conn.execute(
            "UPDATE view_configs SET
                slug = ?1,
                label = ?2,
                roles_json = ?3,
                default_roles_json = ?4,
                is_default = ?5,
                payload_json = ?6,
                updated_at = ?7
             WHERE id = ?8",
            rusqlite::params![
                view.slug,
                view.label,
                encode_roles(&view.roles),
                encode_roles(&view.default_roles),
                view.legacy_default,
                view.payload.to_json().to_string(),
                view.updated_at.timestamp_millis(),
                id,
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Replace a view's default roles and its legacy flag
    pub fn update_default_roles(
        conn: &Connection,
        id: ViewId,
        default_roles: &[String],
        is_default: bool,
    ) -> Result<()> {
        conn.execute(
            "UPDATE view_configs SET default_roles_json = ?1, is_default = ?2 WHERE id = ?3",
            rusqlite::params![encode_roles(default_roles), is_default, id],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Replace a view's role sets
    pub fn update_roles(
        conn: &Connection,
        id: ViewId,
        roles: &[String],
        default_roles: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE view_configs SET
                roles_json = ?1,
                default_roles_json = ?2,
                is_default = ?3,
                updated_at = ?4
             WHERE id = ?5",
            rusqlite::params![
                encode_roles(roles),
                encode_roles(default_roles),
                !default_roles.is_empty(),
                updated_at.timestamp_millis(),
                id,
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    pub fn delete_by_id(conn: &Connection, id: ViewId) -> Result<usize> {
        conn.execute("DELETE FROM view_configs WHERE id = ?1", [id])
            .map_err(from_rusqlite)
    }

    /// Delete every row of a slug; returns the number removed
    pub fn delete_by_slug(
        conn: &Connection,
        entity_type_id: &str,
        kind: ViewKind,
        slug: &str,
    ) -> Result<usize> {
        conn.execute(
            "DELETE FROM view_configs WHERE entity_type_id = ?1 AND kind = ?2 AND slug = ?3",
            rusqlite::params![entity_type_id, kind.as_str(), slug],
        )
        .map_err(from_rusqlite)
    }

    /// Every `(entity_type_id, kind)` bucket holding at least one view
    pub fn buckets(conn: &Connection) -> Result<Vec<(String, ViewKind)>> {
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT entity_type_id, kind FROM view_configs
                 ORDER BY entity_type_id, kind",
            )
            .map_err(from_rusqlite)?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        pairs
            .into_iter()
            .map(|(entity_type_id, kind)| {
                let kind = kind
                    .parse::<ViewKind>()
                    .map_err(|e| corrupt_row("kind", 0, &e.to_string()))?;
                Ok((entity_type_id, kind))
            })
            .collect()
    }

    /// Identity keys held by more than one row
    pub fn duplicate_keys(conn: &Connection) -> Result<Vec<(String, ViewKind, String)>> {
        let mut stmt = conn
            .prepare(
                "SELECT entity_type_id, kind, slug FROM view_configs
                 GROUP BY entity_type_id, kind, slug HAVING COUNT(*) > 1
                 ORDER BY entity_type_id, kind, slug",
            )
            .map_err(from_rusqlite)?;
        let keys = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        keys.into_iter()
            .map(|(entity_type_id, kind, slug)| {
                let kind = kind
                    .parse::<ViewKind>()
                    .map_err(|e| corrupt_row("kind", 0, &e.to_string()))?;
                Ok((entity_type_id, kind, slug))
            })
            .collect()
    }
}
