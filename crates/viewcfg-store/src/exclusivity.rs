//! Default-role exclusivity enforcement
//!
//! Applies the releases planned by `viewcfg_core::exclusivity`. `enforce`
//! runs inside `ViewStore::put` before the target row is written;
//! `repair_all` heals legacy buckets during migration.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo::ViewRepo;
use rusqlite::Connection;
use viewcfg_core::exclusivity::{plan_exclusivity_repair, plan_releases, DefaultRelease};
use viewcfg_core::model::ViewKind;

pub(crate) struct DefaultExclusivityEnforcer;

impl DefaultExclusivityEnforcer {
    /// Strip `claimed` from the default roles of every view in the bucket
    /// other than `target_slug`
    pub(crate) fn enforce(
        conn: &Connection,
        entity_type_id: &str,
        kind: ViewKind,
        target_slug: &str,
        claimed: &[String],
    ) -> Result<Vec<DefaultRelease>> {
        if claimed.is_empty() {
            return Ok(Vec::new());
        }

        let bucket = ViewRepo::list_bucket(conn, entity_type_id, kind)?;
        let releases = plan_releases(&bucket, target_slug, claimed);
        for release in &releases {
            ViewRepo::update_default_roles(
                conn,
                release.id,
                &release.default_roles,
                release.is_default_any(),
            )?;
            tracing::debug!(
                slug = %release.slug,
                released = ?release.released,
                "released default roles"
            );
        }

        Ok(releases)
    }

    /// Leave every default role on one view per bucket, across the table
    ///
    /// Returns the number of views that released a default.
    pub(crate) fn repair_all(conn: &Connection) -> Result<usize> {
        let mut repaired = 0;
        for (entity_type_id, kind) in ViewRepo::buckets(conn)? {
            let bucket = ViewRepo::list_bucket(conn, &entity_type_id, kind)?;
            for release in plan_exclusivity_repair(&bucket) {
                ViewRepo::update_default_roles(
                    conn,
                    release.id,
                    &release.default_roles,
                    release.is_default_any(),
                )?;
                tracing::debug!(
                    entity_type_id = %entity_type_id,
                    kind = %kind,
                    slug = %release.slug,
                    released = ?release.released,
                    "repaired shared default roles"
                );
                repaired += 1;
            }
        }
        Ok(repaired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use viewcfg_core::model::{now_millis, ListColumn, ViewDefinition, ViewPayload};

    fn setup_test_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        migrations::apply_migrations(&mut conn).unwrap();
        conn
    }

    fn insert(conn: &Connection, kind: ViewKind, slug: &str, defaults: &[&str]) -> i64 {
        let now = now_millis();
        let payload = match kind {
            ViewKind::List => ViewPayload::List {
                columns: vec![ListColumn::new("title", "Title")],
            },
            ViewKind::Editor => ViewPayload::Editor { sections: vec![] },
        };
        let view = ViewDefinition {
            id: None,
            entity_type_id: "movie".to_string(),
            kind,
            slug: slug.to_string(),
            label: slug.to_string(),
            roles: vec!["ADMIN".to_string(), "EDITOR".to_string()],
            default_roles: defaults.iter().map(|r| r.to_string()).collect(),
            payload,
            legacy_default: !defaults.is_empty(),
            created_at: now,
            updated_at: now,
        };
        ViewRepo::insert_view(conn, &view).unwrap()
    }

    #[test]
    fn test_enforce_keeps_other_default_roles() {
        let conn = setup_test_db();
        let all = insert(&conn, ViewKind::List, "all", &["ADMIN", "EDITOR"]);
        insert(&conn, ViewKind::List, "compact", &[]);

        let releases = DefaultExclusivityEnforcer::enforce(
            &conn,
            "movie",
            ViewKind::List,
            "compact",
            &["EDITOR".to_string()],
        )
        .unwrap();

        assert_eq!(releases.len(), 1);
        let stored = ViewRepo::get_view(&conn, all).unwrap().unwrap();
        assert_eq!(stored.default_roles, vec!["ADMIN"]);
        assert!(stored.legacy_default);
    }

    #[test]
    fn test_enforce_clears_legacy_flag_with_last_default() {
        let conn = setup_test_db();
        let all = insert(&conn, ViewKind::List, "all", &["EDITOR"]);

        DefaultExclusivityEnforcer::enforce(
            &conn,
            "movie",
            ViewKind::List,
            "compact",
            &["EDITOR".to_string()],
        )
        .unwrap();

        let stored = ViewRepo::get_view(&conn, all).unwrap().unwrap();
        assert!(stored.default_roles.is_empty());
        assert!(!stored.legacy_default);
    }

    #[test]
    fn test_repair_all_keeps_oldest_claimant() {
        let conn = setup_test_db();
        let older = insert(&conn, ViewKind::List, "all", &["EDITOR"]);
        let newer = insert(&conn, ViewKind::List, "compact", &["ADMIN", "EDITOR"]);
        let other_bucket = insert(&conn, ViewKind::Editor, "form", &["EDITOR"]);

        let repaired = DefaultExclusivityEnforcer::repair_all(&conn).unwrap();

        assert_eq!(repaired, 1);
        let kept = ViewRepo::get_view(&conn, older).unwrap().unwrap();
        assert_eq!(kept.default_roles, vec!["EDITOR"]);
        let released = ViewRepo::get_view(&conn, newer).unwrap().unwrap();
        assert_eq!(released.default_roles, vec!["ADMIN"]);
        let untouched = ViewRepo::get_view(&conn, other_bucket).unwrap().unwrap();
        assert_eq!(untouched.default_roles, vec!["EDITOR"]);
    }

    #[test]
    fn test_enforce_is_scoped_to_bucket() {
        let conn = setup_test_db();
        let editor = insert(&conn, ViewKind::Editor, "form", &["EDITOR"]);

        DefaultExclusivityEnforcer::enforce(
            &conn,
            "movie",
            ViewKind::List,
            "compact",
            &["EDITOR".to_string()],
        )
        .unwrap();

        let stored = ViewRepo::get_view(&conn, editor).unwrap().unwrap();
        assert_eq!(stored.default_roles, vec!["EDITOR"]);
    }
}
