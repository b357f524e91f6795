use crate::errors::{Result, ViewError};
use crate::model::{ViewDraft, ViewPayload};

/// Largest supported number of form columns in an editor section
pub const MAX_SECTION_COLUMNS: u8 = 4;

/// Validate a draft before any write is attempted
///
/// Checks, in order: label present, payload non-empty, each column has a
/// field key, each section has a unique id and a supported layout.
///
/// # Errors
/// Returns the first violation found.
pub fn validate_draft(draft: &ViewDraft) -> Result<()> {
    if draft.label.trim().is_empty() {
        return Err(ViewError::MissingLabel);
    }
    validate_payload(&draft.payload)
}

pub fn validate_payload(payload: &ViewPayload) -> Result<()> {
    match payload {
        ViewPayload::List { columns } => {
            if columns.is_empty() {
                return Err(ViewError::EmptyColumns);
            }
            for (index, column) in columns.iter().enumerate() {
                if column.key.trim().is_empty() {
                    return Err(ViewError::InvalidColumn {
                        index,
                        reason: "column key is required".to_string(),
                    });
                }
            }
        }
        ViewPayload::Editor { sections } => {
            if sections.is_empty() {
                return Err(ViewError::EmptySections);
            }
            for (index, section) in sections.iter().enumerate() {
                if section.id.trim().is_empty() {
                    return Err(ViewError::InvalidSection {
                        index,
                        reason: "section id is required".to_string(),
                    });
                }
                if sections[..index].iter().any(|s| s.id == section.id) {
                    return Err(ViewError::InvalidSection {
                        index,
                        reason: format!("duplicate section id '{}'", section.id),
                    });
                }
                if section.column_count == 0 || section.column_count > MAX_SECTION_COLUMNS {
                    return Err(ViewError::InvalidLayout {
                        section_id: section.id.clone(),
                        layout: section.column_count,
                    });
                }
            }
        }
    }
    Ok(())
}
