#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{migration_dir, write_file, FakeDatabase};
use schemup_core::errors::{ExErrorKind, MigrationError};
use schemup_core::logging_facility::test_capture::init_test_capture;
use schemup_core::{log_op_end, log_op_error, log_op_start, SchemaUpdater};
use schemup_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    assert_eq!(
        capture.events_for(op_name, EVENT_START).len(),
        1
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events = capture.events_for(op_name, EVENT_END);
    assert_eq!(end_events.len(), 1);
    assert_eq!(end_events[0].duration_ms(), Some(42));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    log_op_error!(op_name, MigrationError::InvalidTarget, duration_ms = 10);

    let error_events = capture.events_for(op_name, EVENT_END_ERROR);
    let error_event = error_events.first().expect("error event");
    let kind = format!("{:?}", ExErrorKind::InvalidTarget);
    assert_eq!(error_event.text("err_kind"), Some(kind.as_str()));
    assert_eq!(error_event.err_code(), Some("ERR_INVALID_TARGET"));
    assert_eq!(error_event.duration_ms(), Some(10));
}

#[test]
fn test_failed_run_logs_error_with_file() {
    let capture = init_test_capture();
    let dir = migration_dir(2);
    write_file(dir.path(), "2_up.sql", "FAIL");
    let db = FakeDatabase::default();

    assert!(!SchemaUpdater::new(&db).apply(dir.path(), 2));

    let file = dir.path().join("2_up.sql").display().to_string();
    let found = capture.count_events(|e| {
        e.is("apply_migration_files", EVENT_END_ERROR)
            && e.err_code() == Some("ERR_MIGRATION_APPLY_FAILED")
            && e.message().is_some_and(|m| m.contains(&file))
    });
    assert!(found >= 1, "no apply error event mentions {}", file);
}

#[test]
fn test_successful_run_logs_start_and_end() {
    let capture = init_test_capture();
    let dir = migration_dir(3);
    let db = FakeDatabase::default();

    assert!(SchemaUpdater::new(&db).apply(dir.path(), 3));

    let directory = dir.path().display().to_string();
    assert!(capture
        .events_for("apply_migration_files", EVENT_START)
        .iter()
        .any(|e| e.target_version() == Some(3)
            && e.text("migration_directory") == Some(directory.as_str())));
    capture.assert_event_exists("apply_migration_files", EVENT_END);
}

#[test]
fn test_successful_run_reports_versions_and_file_count() {
    let capture = init_test_capture();
    let dir = migration_dir(5);
    let db = FakeDatabase::default();

    assert!(SchemaUpdater::new(&db).apply(dir.path(), 5));

    let found = capture.count_events(|e| {
        e.is("apply_migration_files", EVENT_END)
            && e.current_version() == Some(0)
            && e.target_version() == Some(5)
            && e.file_count() == Some(5)
    });
    assert!(found >= 1);
}
