//! Wire bodies for view saves and listings.
//!
//! LIST bodies carry their columns under `config.columns`; EDITOR bodies
//! carry `sections` at the top level. Both accept `default_roles` or
//! `defaultRoles`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use viewcfg_core::errors::ViewError;
use viewcfg_core::model::{
    EditorSection, ListColumn, ViewDefinition, ViewDraft, ViewKind, ViewPayload,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListViewBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(alias = "defaultRoles", skip_serializing_if = "Option::is_none")]
    pub default_roles: Option<Vec<String>>,
    #[serde(default)]
    pub config: ListConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default)]
    pub columns: Vec<ListColumn>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorViewBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(alias = "defaultRoles", skip_serializing_if = "Option::is_none")]
    pub default_roles: Option<Vec<String>>,
    #[serde(default)]
    pub sections: Vec<EditorSection>,
}

struct BodyFields {
    slug: Option<String>,
    previous_slug: Option<String>,
    label: Option<String>,
    roles: Option<Vec<String>>,
    default_roles: Option<Vec<String>>,
}

/// Decode a save body into a draft for `kind`
///
/// Only the shape is checked here; content rules (label present, non-empty
/// payload, layouts) are enforced by the store before it writes.
pub fn decode_view_body(
    entity_type_id: &str,
    kind: ViewKind,
    body: &Value,
) -> Result<ViewDraft, ViewError> {
    if !body.is_object() {
        return Err(ViewError::InvalidBody {
            reason: "expected a JSON object".to_string(),
        });
    }

    let (fields, payload) = match kind {
        ViewKind::List => {
            let b: ListViewBody = serde_json::from_value(body.clone())?;
            (
                BodyFields {
                    slug: b.slug,
                    previous_slug: b.previous_slug,
                    label: b.label,
                    roles: b.roles,
                    default_roles: b.default_roles,
                },
                ViewPayload::List {
                    columns: b.config.columns,
                },
            )
        }
        ViewKind::Editor => {
            let b: EditorViewBody = serde_json::from_value(body.clone())?;
            (
                BodyFields {
                    slug: b.slug,
                    previous_slug: b.previous_slug,
                    label: b.label,
                    roles: b.roles,
                    default_roles: b.default_roles,
                },
                ViewPayload::Editor {
                    sections: b.sections,
                },
            )
        }
    };

    Ok(ViewDraft {
        entity_type_id: entity_type_id.to_string(),
        slug: fields.slug,
        previous_slug: fields.previous_slug,
        label: fields.label.unwrap_or_default(),
        roles: fields.roles,
        default_roles: fields.default_roles,
        payload,
    })
}

/// Encode a view in the wire shape of its kind
///
/// Adds the derived legacy fields `role` (first role) and `is_default`.
pub fn encode_view(view: &ViewDefinition) -> Value {
    let mut out = json!({
        "id": view.id,
        "entity_type_id": view.entity_type_id,
        "kind": view.kind.as_str(),
        "slug": view.slug,
        "label": view.label,
        "roles": view.roles,
        "default_roles": view.default_roles,
        "role": view.legacy_role(),
        "is_default": view.is_default_any(),
        "created_at": view.created_at.timestamp_millis(),
        "updated_at": view.updated_at.timestamp_millis(),
    });

    match &view.payload {
        ViewPayload::List { columns } => {
            out["config"] = json!({ "columns": columns });
        }
        ViewPayload::Editor { sections } => {
            out["sections"] = json!(sections);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_list_body() {
        let body = json!({
            "slug": "all",
            "label": "All",
            "roles": ["editor"],
            "defaultRoles": ["editor"],
            "config": { "columns": [{ "key": "title", "label": "Title" }] }
        });

        let draft = decode_view_body("movie", ViewKind::List, &body).unwrap();

        assert_eq!(draft.slug.as_deref(), Some("all"));
        assert_eq!(draft.default_roles, Some(vec!["editor".to_string()]));
        assert_eq!(draft.payload.field_keys(), vec!["title"]);
    }

    #[test]
    fn test_decode_editor_body_reads_layout() {
        let body = json!({
            "label": "Form",
            "sections": [{ "id": "main", "title": "Main", "layout": 3, "fields": ["title"] }]
        });

        let draft = decode_view_body("movie", ViewKind::Editor, &body).unwrap();

        assert!(draft.slug.is_none());
        assert_eq!(draft.payload.sections()[0].column_count, 3);
        assert_eq!(draft.payload.sections()[0].title, "Main");
    }

    #[test]
    fn test_missing_payload_decodes_empty() {
        let draft = decode_view_body("movie", ViewKind::List, &json!({ "label": "x" })).unwrap();
        assert!(draft.payload.columns().is_empty());
    }

    #[test]
    fn test_wrong_types_are_invalid_body() {
        let err = decode_view_body("movie", ViewKind::List, &json!({ "roles": "EDITOR" }))
            .unwrap_err();
        assert!(matches!(err, ViewError::InvalidBody { .. }));

        let err = decode_view_body("movie", ViewKind::List, &json!(["x"])).unwrap_err();
        assert!(matches!(err, ViewError::InvalidBody { .. }));
    }

    #[test]
    fn test_encode_list_view_matches_wire_shape() {
        let view = viewcfg_core::resolver::builtin_view("movie", ViewKind::List, None);
        let out = encode_view(&view);

        assert_eq!(out["slug"], "default");
        assert_eq!(out["config"]["columns"][0]["key"], "title");
        assert!(out["id"].is_null());
        assert!(out["role"].is_null());
        assert_eq!(out["is_default"], false);
        assert!(out.get("sections").is_none());
    }
}
