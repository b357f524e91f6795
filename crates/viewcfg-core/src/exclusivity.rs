//! Default-role exclusivity planning
//!
//! Within a bucket a role is default for at most one view. Before a save
//! claims roles as default, every other view holding one of those roles
//! releases it. This module computes the releases; the store applies them
//! inside the save transaction.

use crate::model::{ViewDefinition, ViewId};

/// A view losing some of its default roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRelease {
    pub id: ViewId,
    pub slug: String,
    /// Default roles the view keeps
    pub default_roles: Vec<String>,
    /// Default roles taken away from it
    pub released: Vec<String>,
}

impl DefaultRelease {
    /// Recomputed legacy single-default flag
    pub fn is_default_any(&self) -> bool {
        !self.default_roles.is_empty()
    }
}

/// Compute which views must release defaults so `claimed` can move to the
/// view identified by `target_slug`
///
/// Rows sharing `target_slug` are the target itself (duplicates included)
/// and are never touched. Synthesized views have no id and are skipped.
pub fn plan_releases(
    bucket: &[ViewDefinition],
    target_slug: &str,
    claimed: &[String],
) -> Vec<DefaultRelease> {
    if claimed.is_empty() {
        return Vec::new();
    }

    bucket
        .iter()
        .filter(|view| view.slug != target_slug)
        .filter_map(|view| {
            let id = view.id?;
            let (released, kept): (Vec<String>, Vec<String>) = view
                .default_roles
                .iter()
                .cloned()
                .partition(|role| claimed.contains(role));
            if released.is_empty() {
                return None;
            }
            Some(DefaultRelease {
                id,
                slug: view.slug.clone(),
                default_roles: kept,
                released,
            })
        })
        .collect()
}

/// Compute the releases that leave every default role on one view only
///
/// Rows written before exclusivity was enforced may share a default role.
/// The oldest claimant (by `age_key`, the view resolution would pick) keeps
/// it; every younger view releases it.
pub fn plan_exclusivity_repair(bucket: &[ViewDefinition]) -> Vec<DefaultRelease> {
    let mut ordered: Vec<&ViewDefinition> = bucket.iter().collect();
    ordered.sort_by_key(|view| view.age_key());

    let mut owned: Vec<String> = Vec::new();
    let mut releases = Vec::new();
    for view in ordered {
        let Some(id) = view.id else { continue };
        let (released, kept): (Vec<String>, Vec<String>) = view
            .default_roles
            .iter()
            .cloned()
            .partition(|role| owned.contains(role));
        owned.extend(kept.iter().cloned());
        if !released.is_empty() {
            releases.push(DefaultRelease {
                id,
                slug: view.slug.clone(),
                default_roles: kept,
                released,
            });
        }
    }
    releases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{now_millis, ListColumn, ViewKind, ViewPayload};
    use chrono::DateTime;

    fn view(id: i64, slug: &str, roles: &[&str], defaults: &[&str]) -> ViewDefinition {
        ViewDefinition {
            id: Some(id),
            entity_type_id: "movie".to_string(),
            kind: ViewKind::List,
            slug: slug.to_string(),
            label: slug.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            default_roles: defaults.iter().map(|r| r.to_string()).collect(),
            payload: ViewPayload::List {
                columns: vec![ListColumn::new("title", "Title")],
            },
            legacy_default: !defaults.is_empty(),
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    fn claimed(roles: &[&str]) -> Vec<String> {
        roles.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_only_intersecting_roles_are_released() {
        let bucket = vec![
            view(1, "all", &["ADMIN", "EDITOR"], &["ADMIN", "EDITOR"]),
            view(2, "compact", &["EDITOR"], &[]),
        ];
        let releases = plan_releases(&bucket, "compact", &claimed(&["EDITOR"]));

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].id, 1);
        assert_eq!(releases[0].default_roles, vec!["ADMIN"]);
        assert_eq!(releases[0].released, vec!["EDITOR"]);
        assert!(releases[0].is_default_any());
    }

    #[test]
    fn test_target_rows_are_untouched() {
        let bucket = vec![
            view(1, "all", &["EDITOR"], &["EDITOR"]),
            view(2, "all", &["EDITOR"], &["EDITOR"]),
        ];
        assert!(plan_releases(&bucket, "all", &claimed(&["EDITOR"])).is_empty());
    }

    #[test]
    fn test_losing_last_default_clears_legacy_flag() {
        let bucket = vec![view(1, "all", &["EDITOR"], &["EDITOR"])];
        let releases = plan_releases(&bucket, "compact", &claimed(&["EDITOR"]));
        assert!(releases[0].default_roles.is_empty());
        assert!(!releases[0].is_default_any());
    }

    #[test]
    fn test_repair_keeps_each_default_on_oldest_view() {
        let mut older = view(1, "all", &["ADMIN", "EDITOR"], &["ADMIN", "EDITOR"]);
        let mut newer = view(2, "compact", &["EDITOR", "VIEWER"], &["EDITOR", "VIEWER"]);
        older.created_at = DateTime::from_timestamp_millis(100).unwrap();
        newer.created_at = DateTime::from_timestamp_millis(200).unwrap();

        let releases = plan_exclusivity_repair(&[newer, older]);

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].slug, "compact");
        assert_eq!(releases[0].released, vec!["EDITOR"]);
        assert_eq!(releases[0].default_roles, vec!["VIEWER"]);
    }

    #[test]
    fn test_repair_of_exclusive_bucket_is_empty() {
        let bucket = vec![
            view(1, "all", &["ADMIN"], &["ADMIN"]),
            view(2, "compact", &["EDITOR"], &["EDITOR"]),
        ];
        assert!(plan_exclusivity_repair(&bucket).is_empty());
    }

    #[test]
    fn test_nothing_claimed_releases_nothing() {
        let bucket = vec![view(1, "all", &["EDITOR"], &["EDITOR"])];
        assert!(plan_releases(&bucket, "compact", &[]).is_empty());
    }
}
