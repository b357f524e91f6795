#![allow(clippy::unwrap_used, clippy::expect_used)]

use viewcfg_core::errors::{ExError, ExErrorKind, ViewError};
use viewcfg_core::logging_facility::test_capture::init_test_capture;
use viewcfg_core::{log_op_end, log_op_error, log_op_start};
use viewcfg_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert!(
        !start_events.is_empty(),
        "Should have captured at least one start event"
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ViewError::ViewNotFound {
        entity_type_id: "movie".to_string(),
        kind: "list".to_string(),
        slug: "ghost".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(error_events[0].field("err_code"), Some("ERR_NOT_FOUND"));
    assert_eq!(error_events[0].field("err_kind"), Some("NotFound"));
}

#[test]
fn test_boundary_ownership_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_ownership_unique_4";

    log_op_start!(op_name, entity_type_id = "movie");
    log_op_end!(op_name, duration_ms = 42);

    let starts = capture.count(op_name, EVENT_START);
    let ends = capture.count(op_name, EVENT_END);

    assert_eq!(starts, 1, "Should have exactly one start event");
    assert_eq!(ends, 1, "Should have exactly one end event");
}

#[test]
fn test_error_event_accepts_ex_error() {
    let capture = init_test_capture();
    let op_name = "test_error_event_unique_5";

    let err = ExError::new(ExErrorKind::Concurrency).with_message("database is locked");
    log_op_error!(op_name, err, duration_ms = 5, slug = "all");

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let event = capture
        .events_for_op(op_name)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(event.field("err_code"), Some("ERR_CONCURRENCY"));
    assert_eq!(event.field("slug"), Some("all"));
}

#[test]
fn test_log_macros_with_multiple_fields() {
    let capture = init_test_capture();
    let op_name = "test_multiple_fields_unique_6";

    log_op_start!(op_name, entity_type_id = "movie", view_kind = "list");
    log_op_end!(op_name, duration_ms = 7, slug = "all", view_count = 3u64);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].field("entity_type_id"), Some("movie"));
    assert_eq!(events[0].field("view_kind"), Some("list"));
    assert_eq!(events[1].field("slug"), Some("all"));
    assert_eq!(events[1].field("view_count"), Some("3"));
    assert!(events.iter().all(|e| e.component.is_some()));
}
