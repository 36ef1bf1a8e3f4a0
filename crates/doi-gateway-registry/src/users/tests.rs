// crates/doi-gateway-registry/src/users/tests.rs
// ============================================================================
// Module: User Registry Tests
// Description: Unit tests for user lifecycle and assignment bookkeeping.
// Purpose: Validate CRUD, admin flags, atomic removal, and notifications.
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
use std::sync::Mutex;

use doi_gateway_core::DoiDataAccess;
use doi_gateway_core::Notifier;
use doi_gateway_core::NotifyError;
use doi_gateway_core::StoreError;
use doi_gateway_store_sqlite::SqliteDataAccess;

use super::RegistryError;
use super::UserRegistry;

/// Notifier capturing (subject, body, recipient) triples.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((subject.to_string(), body.to_string(), recipient.to_string()));
        }
        Ok(())
    }
}

fn registry() -> (UserRegistry, Arc<SqliteDataAccess>, Arc<RecordingNotifier>) {
    let store = Arc::new(SqliteDataAccess::open_in_memory().unwrap());
    let notifier = Arc::new(RecordingNotifier::default());
    let registry = UserRegistry::new(
        Arc::clone(&store) as Arc<dyn DoiDataAccess>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        "admins@example.org",
    );
    (registry, store, notifier)
}

#[test]
fn users_round_trip_with_optional_email() {
    let (registry, _store, _notifier) = registry();
    registry.add_user("alice", Some("alice@example.org")).unwrap();
    registry.add_user("bob", None).unwrap();

    let alice = registry.find_user("alice").unwrap().unwrap();
    assert_eq!(alice.email.as_deref(), Some("alice@example.org"));
    assert!(!alice.admin);
    assert!(registry.user_exists("bob").unwrap());
    assert_eq!(registry.list_users().unwrap().len(), 2);
}

#[test]
fn duplicate_usernames_conflict() {
    let (registry, _store, _notifier) = registry();
    registry.add_user("alice", None).unwrap();
    assert!(matches!(
        registry.add_user("alice", None).unwrap_err(),
        RegistryError::Store(StoreError::Conflict(_))
    ));
}

#[test]
fn empty_usernames_are_rejected() {
    let (registry, _store, _notifier) = registry();
    assert!(matches!(registry.add_user("  ", None).unwrap_err(), RegistryError::Invalid(_)));
}

#[test]
fn the_admin_flag_toggles() {
    let (registry, _store, _notifier) = registry();
    registry.add_user("alice", None).unwrap();
    assert!(!registry.is_admin("alice").unwrap());

    registry.set_admin("alice", true).unwrap();
    assert!(registry.is_admin("alice").unwrap());

    registry.set_admin("alice", false).unwrap();
    assert!(!registry.is_admin("alice").unwrap());
}

#[test]
fn setting_the_flag_on_an_unknown_user_is_not_found() {
    let (registry, _store, _notifier) = registry();
    assert!(matches!(
        registry.set_admin("ghost", true).unwrap_err(),
        RegistryError::Store(StoreError::NotFound(_))
    ));
}

#[test]
fn assignments_bind_users_to_projects() {
    let (registry, store, _notifier) = registry();
    store.create_project(42, "atmosphere").unwrap();
    registry.add_user("alice", None).unwrap();
    registry.add_user("bob", None).unwrap();

    registry.assign("alice", 42).unwrap();
    registry.assign("bob", 42).unwrap();
    assert_eq!(registry.users_for_project(42).unwrap(), vec!["alice", "bob"]);
    assert_eq!(registry.projects_for_user("alice").unwrap(), vec![42]);

    registry.unassign("bob", 42).unwrap();
    assert_eq!(registry.users_for_project(42).unwrap(), vec!["alice"]);
}

#[test]
fn assigning_to_a_missing_side_is_not_found() {
    let (registry, store, _notifier) = registry();
    store.create_project(42, "atmosphere").unwrap();
    registry.add_user("alice", None).unwrap();

    assert!(matches!(
        registry.assign("ghost", 42).unwrap_err(),
        RegistryError::Store(StoreError::NotFound(_))
    ));
    assert!(matches!(
        registry.assign("alice", 7).unwrap_err(),
        RegistryError::Store(StoreError::NotFound(_))
    ));
}

#[test]
fn removal_drops_assignments_and_notifies_the_contact() {
    let (registry, store, notifier) = registry();
    store.create_project(42, "atmosphere").unwrap();
    registry.add_user("alice", Some("alice@example.org")).unwrap();
    registry.assign("alice", 42).unwrap();

    registry.remove_user("alice").unwrap();
    assert!(!registry.user_exists("alice").unwrap());
    assert!(registry.users_for_project(42).unwrap().is_empty());

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (subject, body, recipient) = &sent[0];
    assert_eq!(subject, "doi gateway user removed");
    assert!(body.contains("alice"));
    assert!(body.contains("1 project"));
    assert_eq!(recipient, "admins@example.org");
}

#[test]
fn removing_an_unknown_user_is_not_found_and_silent() {
    let (registry, _store, notifier) = registry();
    assert!(matches!(
        registry.remove_user("ghost").unwrap_err(),
        RegistryError::Store(StoreError::NotFound(_))
    ));
    assert!(notifier.sent.lock().unwrap().is_empty());
}
