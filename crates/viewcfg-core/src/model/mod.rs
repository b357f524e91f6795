//! Domain model for view configurations

pub mod entity_type;
pub mod view;

pub use entity_type::{EntityType, FieldDef, FieldType};
pub use view::{
    now_millis, EditorSection, ListColumn, ViewDefinition, ViewDraft, ViewId, ViewKind,
    ViewPayload,
};
