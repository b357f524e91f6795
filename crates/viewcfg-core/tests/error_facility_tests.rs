use viewcfg_core::errors::{ExError, ExErrorKind, ViewError};
use viewcfg_core_types::RequestId;

#[test]
fn test_entity_type_not_found_verifiable_by_kind() {
    let err = ViewError::EntityTypeNotFound {
        entity_type_id: "unknown".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.entity_type_id(), Some("unknown"));
}

#[test]
fn test_view_not_found_carries_coordinates() {
    let err = ViewError::ViewNotFound {
        entity_type_id: "movie".to_string(),
        kind: "editor".to_string(),
        slug: "form".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.view_kind(), Some("editor"));
    assert_eq!(ex_err.slug(), Some("form"));
}

#[test]
fn test_slug_conflict_distinct_from_validation() {
    let conflict: ExError = ViewError::SlugConflict {
        slug: "all".to_string(),
    }
    .into();
    let invalid: ExError = ViewError::EmptyColumns.into();

    assert_eq!(conflict.kind(), ExErrorKind::Conflict);
    assert_eq!(invalid.kind(), ExErrorKind::InvalidInput);
    assert_ne!(conflict.code(), invalid.code());
}

#[test]
fn test_invalid_layout_message() {
    let ex_err: ExError = ViewError::InvalidLayout {
        section_id: "main".to_string(),
        layout: 9,
    }
    .into();

    assert_eq!(ex_err.code(), "ERR_INVALID_INPUT");
    assert!(ex_err.message().contains("main"));
}

#[test]
fn test_error_kind_code_mapping() {
    // Each kind has a stable, unique code
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::Conflict, "ERR_CONFLICT"),
        (ExErrorKind::Transaction, "ERR_TRANSACTION"),
        (ExErrorKind::Concurrency, "ERR_CONCURRENCY"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, code) in kinds {
        assert_eq!(kind.code(), code);
        assert!(seen.insert(code), "duplicate code {}", code);
    }
}

#[test]
fn test_only_environmental_failures_are_retryable() {
    assert!(ExErrorKind::Transaction.is_retryable());
    assert!(ExErrorKind::Concurrency.is_retryable());
    assert!(!ExErrorKind::Conflict.is_retryable());
    assert!(!ExErrorKind::InvalidInput.is_retryable());
    assert!(!ExErrorKind::NotFound.is_retryable());
}

#[test]
fn test_builder_context_in_display() {
    let request_id = RequestId::new();
    let err = ExError::new(ExErrorKind::Persistence)
        .with_op("put_view")
        .with_entity_type_id("movie")
        .with_request_id(request_id.clone())
        .with_message("disk I/O error");

    let rendered = err.to_string();
    assert!(rendered.contains("ERR_PERSISTENCE"));
    assert!(rendered.contains("put_view"));
    assert_eq!(err.request_id(), Some(&request_id));
}
