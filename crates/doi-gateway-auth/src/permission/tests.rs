// crates/doi-gateway-auth/src/permission/tests.rs
// ============================================================================
// Module: Permission Checker Tests
// Description: Unit tests for the role resolution and matching matrix.
// Purpose: Validate explicit, auto-selected, ambiguous, and mismatched roles.
// Dependencies: doi-gateway-core, doi-gateway-store-sqlite
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use doi_gateway_core::DoiDataAccess;
use doi_gateway_core::DoiName;
use doi_gateway_store_sqlite::SqliteDataAccess;

use super::PermissionChecker;
use super::PermissionError;
use crate::audit::MemoryAuditSink;
use crate::audit::token_fingerprint;

const PREFIX: &str = "10.24400";

fn checker_with_sink() -> (PermissionChecker, Arc<MemoryAuditSink>, Arc<SqliteDataAccess>) {
    let store = Arc::new(SqliteDataAccess::open_in_memory().unwrap());
    store.create_project(42, "atmosphere").unwrap();
    store.create_project(7, "ocean").unwrap();
    store.create_user("alice", false, None).unwrap();
    store.create_user("bob", false, None).unwrap();
    store.create_user("carol", false, None).unwrap();
    store.add_assignment("alice", 42).unwrap();
    store.add_assignment("bob", 42).unwrap();
    store.add_assignment("bob", 7).unwrap();

    let sink = Arc::new(MemoryAuditSink::new());
    let checker = PermissionChecker::new(
        Arc::clone(&store) as Arc<dyn DoiDataAccess>,
        Arc::clone(&sink) as Arc<dyn crate::audit::AuditSink>,
    );
    (checker, sink, store)
}

fn doi(raw: &str) -> DoiName {
    DoiName::parse(raw, PREFIX).unwrap()
}

#[test]
fn an_explicitly_selected_granted_role_is_allowed() {
    let (checker, sink, _store) = checker_with_sink();
    let resolved = checker.check("bob", &doi("10.24400/42/dataset"), Some(42)).unwrap();
    assert_eq!(resolved, 42);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].allowed);
    assert_eq!(events[0].role, Some(42));
}

#[test]
fn an_ungranted_explicit_role_is_unauthorized() {
    let (checker, sink, _store) = checker_with_sink();
    let err = checker.check("alice", &doi("10.24400/7/dataset"), Some(7)).unwrap_err();
    assert!(matches!(err, PermissionError::Unauthorized(_)));
    assert!(!sink.events()[0].allowed);
}

#[test]
fn a_single_granted_role_is_auto_selected() {
    let (checker, _sink, _store) = checker_with_sink();
    let resolved = checker.check("alice", &doi("10.24400/42/dataset"), None).unwrap();
    assert_eq!(resolved, 42);
}

#[test]
fn no_selection_with_many_roles_is_a_conflict() {
    let (checker, _sink, _store) = checker_with_sink();
    let err = checker.check("bob", &doi("10.24400/42/dataset"), None).unwrap_err();
    assert!(matches!(err, PermissionError::Conflict(_)));
}

#[test]
fn no_selection_with_no_roles_is_a_conflict() {
    let (checker, _sink, _store) = checker_with_sink();
    let err = checker.check("carol", &doi("10.24400/42/dataset"), None).unwrap_err();
    assert!(matches!(err, PermissionError::Conflict(_)));
}

#[test]
fn a_role_that_does_not_match_the_doi_project_is_unauthorized() {
    let (checker, _sink, _store) = checker_with_sink();
    let err = checker.check("bob", &doi("10.24400/7/dataset"), Some(42)).unwrap_err();
    assert!(matches!(err, PermissionError::Unauthorized(_)));
}

#[test]
fn a_non_numeric_doi_project_segment_is_unauthorized() {
    let (checker, _sink, _store) = checker_with_sink();
    let err = checker.check("alice", &doi("10.24400/atmos/dataset"), None).unwrap_err();
    assert!(matches!(err, PermissionError::Unauthorized(_)));
}

#[test]
fn a_presented_token_is_fingerprinted_in_the_audit_trail() {
    let (checker, sink, _store) = checker_with_sink();
    checker
        .check_with_token("alice", &doi("10.24400/42/dataset"), None, "opaque-token")
        .unwrap();
    let events = sink.events();
    assert_eq!(
        events[0].token_fingerprint.as_deref(),
        Some(token_fingerprint("opaque-token").as_str())
    );
}
