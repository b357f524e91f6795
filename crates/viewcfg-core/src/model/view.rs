//! View definitions
//!
//! A view is a named, role-scoped presentation configuration for one entity
//! type: either a LIST column set or an EDITOR section layout. Views are
//! grouped into buckets by `(entity_type_id, kind)`; slugs are unique and a
//! role may be default for at most one view inside a bucket.

use crate::errors::ViewError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned view identity
pub type ViewId = i64;

/// Which presentation a view configures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Table/grid column set
    List,
    /// Form section/field layout
    Editor,
}

impl ViewKind {
    pub const ALL: [ViewKind; 2] = [ViewKind::List, ViewKind::Editor];

    /// Stable lowercase name used in storage and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::List => "list",
            ViewKind::Editor => "editor",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(ViewKind::List),
            "editor" => Ok(ViewKind::Editor),
            _ => Err(ViewError::UnknownViewKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// A LIST column: which field to show and under what heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListColumn {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub label: String,
}

impl ListColumn {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

fn one_column() -> u8 {
    1
}

/// An EDITOR section grouping an ordered list of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Number of form columns the section is laid out in
    #[serde(rename = "layout", default = "one_column")]
    pub column_count: u8,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl EditorSection {
    pub fn new(id: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            column_count: 1,
            fields,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_column_count(mut self, column_count: u8) -> Self {
        self.column_count = column_count;
        self
    }
}

/// Kind-specific view content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPayload {
    List { columns: Vec<ListColumn> },
    Editor { sections: Vec<EditorSection> },
}

#[derive(Serialize, Deserialize)]
struct ListPayloadJson {
    columns: Vec<ListColumn>,
}

#[derive(Serialize, Deserialize)]
struct EditorPayloadJson {
    sections: Vec<EditorSection>,
}

impl ViewPayload {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewPayload::List { .. } => ViewKind::List,
            ViewPayload::Editor { .. } => ViewKind::Editor,
        }
    }

    pub fn columns(&self) -> &[ListColumn] {
        match self {
            ViewPayload::List { columns } => columns,
            ViewPayload::Editor { .. } => &[],
        }
    }

    pub fn sections(&self) -> &[EditorSection] {
        match self {
            ViewPayload::List { .. } => &[],
            ViewPayload::Editor { sections } => sections,
        }
    }

    /// Field keys referenced by the payload, in display order
    pub fn field_keys(&self) -> Vec<&str> {
        match self {
            ViewPayload::List { columns } => columns.iter().map(|c| c.key.as_str()).collect(),
            ViewPayload::Editor { sections } => sections
                .iter()
                .flat_map(|s| s.fields.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Storage encoding: `{"columns": [...]}` or `{"sections": [...]}`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ViewPayload::List { columns } => serde_json::json!({ "columns": columns }),
            ViewPayload::Editor { sections } => serde_json::json!({ "sections": sections }),
        }
    }

    pub fn from_json(kind: ViewKind, json: &str) -> Result<Self, ViewError> {
        Ok(match kind {
            ViewKind::List => {
                let p: ListPayloadJson = serde_json::from_str(json)?;
                ViewPayload::List { columns: p.columns }
            }
            ViewKind::Editor => {
                let p: EditorPayloadJson = serde_json::from_str(json)?;
                ViewPayload::Editor {
                    sections: p.sections,
                }
            }
        })
    }
}

/// Current time truncated to the millisecond precision used in storage
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A persisted (or synthesized) view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefinition {
    /// `None` only for the in-memory built-in fallback
    pub id: Option<ViewId>,
    pub entity_type_id: String,
    pub kind: ViewKind,
    pub slug: String,
    pub label: String,
    /// Roles allowed to use the view; empty means every role
    pub roles: Vec<String>,
    /// Roles for which the view is auto-selected; always a subset of `roles`
    pub default_roles: Vec<String>,
    pub payload: ViewPayload,
    /// Single-default flag as stored for older consumers
    pub legacy_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ViewDefinition {
    pub fn is_builtin(&self) -> bool {
        self.id.is_none()
    }

    /// Whether `role` may use this view
    pub fn is_visible_to(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.iter().any(|r| r == role)
    }

    pub fn is_default_for(&self, role: &str) -> bool {
        self.default_roles.iter().any(|r| r == role)
    }

    /// Legacy "is default" view of the role sets
    pub fn is_default_any(&self) -> bool {
        !self.default_roles.is_empty() || self.legacy_default
    }

    /// Legacy single-role view of the role set
    pub fn legacy_role(&self) -> Option<&str> {
        self.roles.first().map(String::as_str)
    }

    /// Ordering key for listings, fallback and dedup: `created_at`, then `id`
    pub fn age_key(&self) -> (DateTime<Utc>, ViewId) {
        (self.created_at, self.id.unwrap_or(ViewId::MAX))
    }
}

/// Caller input for a view save
///
/// `slug` may be omitted to derive it from the label. `previous_slug` names
/// the view being renamed; without it the target slug is the lookup key.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDraft {
    pub entity_type_id: String,
    pub slug: Option<String>,
    pub previous_slug: Option<String>,
    pub label: String,
    pub roles: Option<Vec<String>>,
    pub default_roles: Option<Vec<String>>,
    pub payload: ViewPayload,
}

impl ViewDraft {
    pub fn new(
        entity_type_id: impl Into<String>,
        label: impl Into<String>,
        payload: ViewPayload,
    ) -> Self {
        Self {
            entity_type_id: entity_type_id.into(),
            slug: None,
            previous_slug: None,
            label: label.into(),
            roles: None,
            default_roles: None,
            payload,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.payload.kind()
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_previous_slug(mut self, slug: impl Into<String>) -> Self {
        self.previous_slug = Some(slug.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}
