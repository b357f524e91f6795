//! Entity types as supplied by the external catalog
//!
//! The view store only reads these. Field kinds are a closed tag set so a
//! presentation layer can dispatch each kind to its own widget.

use serde::{Deserialize, Serialize};

/// Kind of a field in an entity type's catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    RichText,
    Number,
    Boolean,
    Date,
    Select,
    Relation,
    Media,
    /// A kind this build does not know about
    #[serde(other)]
    Other,
}

/// One entry of an entity type's ordered field catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
        }
    }
}

/// A content-model definition with an ordered field catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityType {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field to the catalog (builder style)
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }
}
