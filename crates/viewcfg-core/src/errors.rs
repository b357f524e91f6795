use viewcfg_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using ViewError
pub type Result<T> = std::result::Result<T, ViewError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error leaving the engine is classified into one of these kinds.
/// Each kind maps to a stable code for programmatic handling by the
/// request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller misuse, rejected before any write
    InvalidInput,
    NotFound,
    Conflict,

    // Infrastructure
    /// The surrounding transaction could not begin or commit
    Transaction,
    /// The database was busy or locked by another writer
    Concurrency,
    Persistence,
    Serialization,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::Transaction => "ERR_TRANSACTION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an operation failing with this kind may be retried unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExErrorKind::Transaction | ExErrorKind::Concurrency)
    }
}

/// Canonical structured error type
///
/// Carries a classification plus the view coordinates the failure refers to.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_type_id: Option<String>,
    view_kind: Option<String>,
    slug: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_type_id: None,
            view_kind: None,
            slug: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity type context
    pub fn with_entity_type_id(mut self, id: impl Into<String>) -> Self {
        self.entity_type_id = Some(id.into());
        self
    }

    /// Add view kind context
    pub fn with_view_kind(mut self, kind: impl Into<String>) -> Self {
        self.view_kind = Some(kind.into());
        self
    }

    /// Add slug context
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_type_id(&self) -> Option<&str> {
        self.entity_type_id.as_deref()
    }

    pub fn view_kind(&self) -> Option<&str> {
        self.view_kind.as_deref()
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_type_id) = &self.entity_type_id {
            write!(f, " (entity_type_id: {})", entity_type_id)?;
        }
        if let Some(view_kind) = &self.view_kind {
            write!(f, " (kind: {})", view_kind)?;
        }
        if let Some(slug) = &self.slug {
            write!(f, " (slug: {})", slug)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised while validating or resolving views
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    /// The entity-type catalog does not know this entity type
    #[error("Entity type not found: {entity_type_id}")]
    EntityTypeNotFound { entity_type_id: String },

    /// No view with this slug exists in the bucket
    #[error("View not found: {entity_type_id}/{kind}/{slug}")]
    ViewNotFound {
        entity_type_id: String,
        kind: String,
        slug: String,
    },

    #[error("View label is required")]
    MissingLabel,

    /// No explicit slug was given and none could be derived from the label
    #[error("View slug is required (could not derive one from label '{label}')")]
    MissingSlug { label: String },

    #[error("List view must define at least one column")]
    EmptyColumns,

    #[error("Editor view must define at least one section")]
    EmptySections,

    #[error("Invalid column at position {index}: {reason}")]
    InvalidColumn { index: usize, reason: String },

    #[error("Invalid section at position {index}: {reason}")]
    InvalidSection { index: usize, reason: String },

    /// Section column count outside the supported range
    #[error("Section '{section_id}' has unsupported layout {layout} (expected 1-4 columns)")]
    InvalidLayout { section_id: String, layout: u8 },

    /// An explicit slug that is not already in canonical form
    #[error("Slug '{slug}' is not URL-safe (expected '{suggested}')")]
    InvalidSlug { slug: String, suggested: String },

    /// The slug already names a different view in the bucket
    #[error("Slug '{slug}' is already used by another view")]
    SlugConflict { slug: String },

    #[error("Unknown view kind: {kind}")]
    UnknownViewKind { kind: String },

    #[error("Invalid view body: {reason}")]
    InvalidBody { reason: String },
}

impl From<ViewError> for ExError {
    fn from(err: ViewError) -> Self {
        let message = err.to_string();
        match err {
            ViewError::EntityTypeNotFound { entity_type_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_type_id(entity_type_id)
                .with_message(message),
            ViewError::ViewNotFound {
                entity_type_id,
                kind,
                slug,
            } => ExError::new(ExErrorKind::NotFound)
                .with_entity_type_id(entity_type_id)
                .with_view_kind(kind)
                .with_slug(slug)
                .with_message(message),
            ViewError::SlugConflict { slug } => ExError::new(ExErrorKind::Conflict)
                .with_slug(slug)
                .with_message(message),
            ViewError::MissingLabel
            | ViewError::MissingSlug { .. }
            | ViewError::InvalidSlug { .. }
            | ViewError::EmptyColumns
            | ViewError::EmptySections
            | ViewError::InvalidColumn { .. }
            | ViewError::InvalidSection { .. }
            | ViewError::InvalidLayout { .. }
            | ViewError::UnknownViewKind { .. }
            | ViewError::InvalidBody { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::InvalidBody {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_invalid_input() {
        let cases = [
            ViewError::MissingLabel,
            ViewError::EmptyColumns,
            ViewError::EmptySections,
            ViewError::MissingSlug {
                label: "!!!".to_string(),
            },
        ];
        for err in cases {
            let ex: ExError = err.into();
            assert_eq!(ex.kind(), ExErrorKind::InvalidInput);
            assert_eq!(ex.code(), "ERR_INVALID_INPUT");
        }
    }

    #[test]
    fn test_slug_conflict_carries_slug() {
        let ex: ExError = ViewError::SlugConflict {
            slug: "compact".to_string(),
        }
        .into();
        assert_eq!(ex.kind(), ExErrorKind::Conflict);
        assert_eq!(ex.slug(), Some("compact"));
        assert!(!ex.is_retryable());
    }

    #[test]
    fn test_view_not_found_carries_coordinates() {
        let ex: ExError = ViewError::ViewNotFound {
            entity_type_id: "movie".to_string(),
            kind: "list".to_string(),
            slug: "all".to_string(),
        }
        .into();
        assert_eq!(ex.code(), "ERR_NOT_FOUND");
        assert_eq!(ex.entity_type_id(), Some("movie"));
        assert_eq!(ex.view_kind(), Some("list"));
        assert_eq!(ex.slug(), Some("all"));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ExErrorKind::Transaction.is_retryable());
        assert!(ExErrorKind::Concurrency.is_retryable());
        assert!(!ExErrorKind::Persistence.is_retryable());
        assert!(!ExErrorKind::NotFound.is_retryable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::Transaction)
            .with_op("put_view")
            .with_entity_type_id("movie")
            .with_message("database is locked");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_TRANSACTION]"));
        assert!(rendered.contains("put_view"));
        assert!(rendered.contains("movie"));
    }
}
