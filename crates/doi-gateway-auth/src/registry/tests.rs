// crates/doi-gateway-auth/src/registry/tests.rs
// ============================================================================
// Module: Token Registry Tests
// Description: Unit tests for token bookkeeping over the store seam.
// Purpose: Validate record/revoke/list round trips and input rejection.
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

use doi_gateway_core::ManualClock;
use doi_gateway_core::StoreError;
use doi_gateway_store_sqlite::SqliteDataAccess;

use super::TokenRegistry;

fn registry() -> TokenRegistry {
    let store = Arc::new(SqliteDataAccess::open_in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    TokenRegistry::new(store, clock)
}

#[test]
fn recorded_tokens_are_listed_until_revoked() {
    let registry = registry();
    registry.record("token-a").unwrap();
    registry.record("token-b").unwrap();
    assert!(registry.is_recorded("token-a").unwrap());

    let mut listed = registry.list().unwrap();
    listed.sort();
    assert_eq!(listed, vec!["token-a", "token-b"]);

    registry.revoke("token-a").unwrap();
    assert!(!registry.is_recorded("token-a").unwrap());
    assert_eq!(registry.list().unwrap(), vec!["token-b"]);
}

#[test]
fn recording_the_same_token_twice_is_a_conflict() {
    let registry = registry();
    registry.record("token-a").unwrap();
    assert!(matches!(registry.record("token-a"), Err(StoreError::Conflict(_))));
}

#[test]
fn an_empty_token_is_rejected_before_the_store() {
    let registry = registry();
    assert!(matches!(registry.record("  "), Err(StoreError::Invalid(_))));
}

#[test]
fn revoking_an_unknown_token_is_not_found() {
    let registry = registry();
    assert!(matches!(registry.revoke("ghost"), Err(StoreError::NotFound(_))));
}
