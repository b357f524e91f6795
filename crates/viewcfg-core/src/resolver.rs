//! Default-view resolution
//!
//! Picks the view a role sees when it has not chosen one. The chain always
//! produces a view:
//!
//! 1. the view whose default roles contain the role
//! 2. the oldest view carrying the legacy single-default flag
//! 3. the oldest view in the bucket
//! 4. a built-in view synthesized in memory (never persisted)

use crate::model::{
    EditorSection, EntityType, ListColumn, ViewDefinition, ViewKind, ViewPayload,
};
use crate::rules::normalize_role;
use chrono::{DateTime, Utc};

/// Slug of the synthesized fallback view
pub const BUILTIN_SLUG: &str = "default";

/// Columns of the built-in LIST view
pub const BUILTIN_LIST_COLUMNS: [(&str, &str); 3] = [
    ("title", "Title"),
    ("status", "Status"),
    ("updated_at", "Updated"),
];

/// System fields every record carries, first in the built-in EDITOR section
pub const BUILTIN_EDITOR_FIELDS: [&str; 2] = ["title", "status"];

/// Which step of the chain produced the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    RoleDefault,
    LegacyDefault,
    FirstCreated,
    Builtin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub view: ViewDefinition,
    pub tier: ResolutionTier,
}

/// Resolve the default view of a bucket for `role`
///
/// `bucket` holds every stored view of `(entity_type_id, kind)` in any
/// order. `entity_type` feeds the field list of the built-in EDITOR view.
pub fn resolve_default(
    bucket: &[ViewDefinition],
    entity_type_id: &str,
    kind: ViewKind,
    role: &str,
    entity_type: Option<&EntityType>,
) -> Resolution {
    if let Some(role) = normalize_role(role) {
        if let Some(view) = oldest(bucket, |v| v.is_default_for(&role)) {
            return Resolution {
                view,
                tier: ResolutionTier::RoleDefault,
            };
        }
    }

    if let Some(view) = oldest(bucket, |v| v.legacy_default) {
        return Resolution {
            view,
            tier: ResolutionTier::LegacyDefault,
        };
    }

    if let Some(view) = oldest(bucket, |_| true) {
        return Resolution {
            view,
            tier: ResolutionTier::FirstCreated,
        };
    }

    Resolution {
        view: builtin_view(entity_type_id, kind, entity_type),
        tier: ResolutionTier::Builtin,
    }
}

fn oldest(
    bucket: &[ViewDefinition],
    pred: impl Fn(&ViewDefinition) -> bool,
) -> Option<ViewDefinition> {
    bucket
        .iter()
        .filter(|&v| pred(v))
        .min_by_key(|v| v.age_key())
        .cloned()
}

/// Synthesize the built-in view for an empty bucket
pub fn builtin_view(
    entity_type_id: &str,
    kind: ViewKind,
    entity_type: Option<&EntityType>,
) -> ViewDefinition {
    let payload = match kind {
        ViewKind::List => ViewPayload::List {
            columns: BUILTIN_LIST_COLUMNS
                .iter()
                .map(|(key, label)| ListColumn::new(*key, *label))
                .collect(),
        },
        ViewKind::Editor => {
            let mut fields: Vec<String> =
                BUILTIN_EDITOR_FIELDS.iter().map(|f| f.to_string()).collect();
            for field in entity_type.map(|et| et.fields.as_slice()).unwrap_or_default() {
                if !fields.contains(&field.key) {
                    fields.push(field.key.clone());
                }
            }
            ViewPayload::Editor {
                sections: vec![EditorSection::new("main", fields)],
            }
        }
    };

    let epoch = DateTime::<Utc>::default();
    ViewDefinition {
        id: None,
        entity_type_id: entity_type_id.to_string(),
        kind,
        slug: BUILTIN_SLUG.to_string(),
        label: "Default".to_string(),
        roles: Vec::new(),
        default_roles: Vec::new(),
        payload,
        legacy_default: false,
        created_at: epoch,
        updated_at: epoch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDef, FieldType};

    fn view(id: i64, created_ms: i64, slug: &str, defaults: &[&str], legacy: bool) -> ViewDefinition {
        let at = DateTime::from_timestamp_millis(created_ms).unwrap();
        ViewDefinition {
            id: Some(id),
            entity_type_id: "movie".to_string(),
            kind: ViewKind::List,
            slug: slug.to_string(),
            label: slug.to_string(),
            roles: vec!["ADMIN".to_string(), "EDITOR".to_string()],
            default_roles: defaults.iter().map(|r| r.to_string()).collect(),
            payload: ViewPayload::List {
                columns: vec![ListColumn::new("title", "Title")],
            },
            legacy_default: legacy,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_role_default_wins() {
        let bucket = vec![
            view(1, 100, "first", &[], true),
            view(2, 200, "mine", &["EDITOR"], true),
        ];
        let r = resolve_default(&bucket, "movie", ViewKind::List, "editor", None);
        assert_eq!(r.tier, ResolutionTier::RoleDefault);
        assert_eq!(r.view.slug, "mine");
    }

    #[test]
    fn test_legacy_flag_before_first_created() {
        let bucket = vec![
            view(1, 100, "first", &[], false),
            view(2, 200, "legacy", &[], true),
        ];
        let r = resolve_default(&bucket, "movie", ViewKind::List, "VIEWER", None);
        assert_eq!(r.tier, ResolutionTier::LegacyDefault);
        assert_eq!(r.view.slug, "legacy");
    }

    #[test]
    fn test_first_created_fallback() {
        let bucket = vec![
            view(5, 300, "late", &[], false),
            view(3, 100, "early", &[], false),
        ];
        let r = resolve_default(&bucket, "movie", ViewKind::List, "VIEWER", None);
        assert_eq!(r.tier, ResolutionTier::FirstCreated);
        assert_eq!(r.view.slug, "early");
    }

    #[test]
    fn test_empty_bucket_synthesizes_list_view() {
        let r = resolve_default(&[], "movie", ViewKind::List, "EDITOR", None);
        assert_eq!(r.tier, ResolutionTier::Builtin);
        assert!(r.view.is_builtin());
        let keys = r.view.payload.field_keys();
        assert_eq!(keys, vec!["title", "status", "updated_at"]);
    }

    #[test]
    fn test_empty_bucket_synthesizes_editor_with_catalog_fields() {
        let et = EntityType::new("movie", "Movie")
            .with_field(FieldDef::new("title", "Title", FieldType::Text))
            .with_field(FieldDef::new("year", "Year", FieldType::Number));
        let r = resolve_default(&[], "movie", ViewKind::Editor, "EDITOR", Some(&et));
        let sections = r.view.payload.sections();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].title.is_empty());
        assert_eq!(sections[0].fields, vec!["title", "status", "year"]);
    }

    #[test]
    fn test_blank_role_skips_role_tier() {
        let bucket = vec![view(1, 100, "only", &["EDITOR"], true)];
        let r = resolve_default(&bucket, "movie", ViewKind::List, "  ", None);
        assert_eq!(r.tier, ResolutionTier::LegacyDefault);
    }
}
