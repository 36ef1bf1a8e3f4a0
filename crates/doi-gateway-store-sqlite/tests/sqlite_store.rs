// crates/doi-gateway-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Integration Tests
// Description: End-to-end tests for the SQLite data access store.
// Purpose: Validate CRUD, conflicts, all-or-nothing deletes, and reopen.
// Dependencies: doi-gateway-core, doi-gateway-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Exercises the store against a real `SQLite` file: project uniqueness,
//! user/assignment lifecycle, token bookkeeping, and persistence across
//! reopen.

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

use doi_gateway_core::DoiDataAccess;
use doi_gateway_core::StoreError;
use doi_gateway_store_sqlite::SqliteDataAccess;
use doi_gateway_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

fn open_store(dir: &TempDir) -> SqliteDataAccess {
    let config = SqliteStoreConfig {
        path: dir.path().join("gateway.db"),
        busy_timeout_ms: 1_000,
        journal_mode: doi_gateway_store_sqlite::SqliteJournalMode::Wal,
        sync_mode: doi_gateway_store_sqlite::SqliteSyncMode::Normal,
    };
    SqliteDataAccess::new(&config).unwrap()
}

// ============================================================================
// SECTION: Projects
// ============================================================================

#[test]
fn project_creation_is_unique_by_suffix_and_name() {
    let store = SqliteDataAccess::open_in_memory().unwrap();
    store.create_project(329_360, "Alpha").unwrap();

    let by_suffix = store.create_project(329_360, "Beta").unwrap_err();
    assert!(matches!(by_suffix, StoreError::Conflict(_)));

    let by_name = store.create_project(100_200, "Alpha").unwrap_err();
    assert!(matches!(by_name, StoreError::Conflict(_)));

    assert_eq!(store.project_suffix_for_name("Alpha").unwrap(), Some(329_360));
    assert_eq!(store.project_name_for_suffix(329_360).unwrap(), Some("Alpha".to_string()));
    assert_eq!(store.project_suffix_for_name("Beta").unwrap(), None);
}

#[test]
fn project_rename_and_delete() {
    let store = SqliteDataAccess::open_in_memory().unwrap();
    store.create_project(1_234, "Alpha").unwrap();
    store.rename_project(1_234, "Alpha Prime").unwrap();
    assert_eq!(store.project_name_for_suffix(1_234).unwrap(), Some("Alpha Prime".to_string()));

    store.delete_project(1_234).unwrap();
    assert_eq!(store.project_name_for_suffix(1_234).unwrap(), None);
    assert!(matches!(store.delete_project(1_234).unwrap_err(), StoreError::NotFound(_)));
    assert!(matches!(store.rename_project(1_234, "X").unwrap_err(), StoreError::NotFound(_)));
}

#[test]
fn rejects_invalid_project_values() {
    let store = SqliteDataAccess::open_in_memory().unwrap();
    assert!(matches!(store.create_project(0, "Alpha").unwrap_err(), StoreError::Invalid(_)));
    assert!(matches!(store.create_project(7, "  ").unwrap_err(), StoreError::Invalid(_)));
}

// ============================================================================
// SECTION: Users and Assignments
// ============================================================================

#[test]
fn user_lifecycle() {
    let store = SqliteDataAccess::open_in_memory().unwrap();
    store.create_user("alice", false, Some("alice@example.org")).unwrap();
    assert!(store.user_exists("alice").unwrap());
    assert!(!store.is_admin("alice").unwrap());

    store.set_admin("alice", true).unwrap();
    assert!(store.is_admin("alice").unwrap());

    let user = store.find_user("alice").unwrap().unwrap();
    assert_eq!(user.email.as_deref(), Some("alice@example.org"));

    assert!(matches!(
        store.create_user("alice", false, None).unwrap_err(),
        StoreError::Conflict(_)
    ));
    assert!(matches!(store.set_admin("ghost", true).unwrap_err(), StoreError::NotFound(_)));
}

#[test]
fn assignments_are_unique_pairs_and_require_both_sides() {
    let store = SqliteDataAccess::open_in_memory().unwrap();
    store.create_user("alice", false, None).unwrap();
    store.create_project(42, "Alpha").unwrap();

    store.add_assignment("alice", 42).unwrap();
    assert!(matches!(store.add_assignment("alice", 42).unwrap_err(), StoreError::Conflict(_)));
    assert!(matches!(store.add_assignment("ghost", 42).unwrap_err(), StoreError::NotFound(_)));
    assert!(matches!(store.add_assignment("alice", 99).unwrap_err(), StoreError::NotFound(_)));

    assert_eq!(store.projects_for_user("alice").unwrap(), vec![42]);
    assert_eq!(store.users_for_project(42).unwrap(), vec!["alice".to_string()]);

    store.remove_assignment("alice", 42).unwrap();
    assert!(matches!(
        store.remove_assignment("alice", 42).unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[test]
fn deleting_a_user_removes_their_assignments_atomically() {
    let store = SqliteDataAccess::open_in_memory().unwrap();
    store.create_user("bob", false, None).unwrap();
    store.create_project(7, "Beta").unwrap();
    store.add_assignment("bob", 7).unwrap();

    store.delete_user("bob").unwrap();
    assert!(!store.user_exists("bob").unwrap());
    assert!(store.users_for_project(7).unwrap().is_empty());
    assert!(matches!(store.delete_user("bob").unwrap_err(), StoreError::NotFound(_)));
}

// ============================================================================
// SECTION: Tokens
// ============================================================================

#[test]
fn token_bookkeeping() {
    let store = SqliteDataAccess::open_in_memory().unwrap();
    store.add_token("tok.a", 100).unwrap();
    store.add_token("tok.b", 200).unwrap();

    assert!(store.token_exists("tok.a").unwrap());
    assert_eq!(store.list_tokens().unwrap(), vec!["tok.a".to_string(), "tok.b".to_string()]);

    store.delete_token("tok.a").unwrap();
    assert!(!store.token_exists("tok.a").unwrap());
    assert!(matches!(store.delete_token("tok.a").unwrap_err(), StoreError::NotFound(_)));
    assert!(matches!(store.add_token("tok.b", 300).unwrap_err(), StoreError::Conflict(_)));
}

// ============================================================================
// SECTION: Durability
// ============================================================================

#[test]
fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir);
        store.create_project(77, "Gamma").unwrap();
        store.create_user("carol", true, None).unwrap();
        store.add_assignment("carol", 77).unwrap();
        store.add_token("tok.persist", 1).unwrap();
    }
    let store = open_store(&dir);
    assert_eq!(store.project_name_for_suffix(77).unwrap(), Some("Gamma".to_string()));
    assert!(store.is_admin("carol").unwrap());
    assert_eq!(store.projects_for_user("carol").unwrap(), vec![77]);
    assert!(store.token_exists("tok.persist").unwrap());
}
