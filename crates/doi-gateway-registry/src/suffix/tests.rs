// crates/doi-gateway-registry/src/suffix/tests.rs
// ============================================================================
// Module: Suffix Registry Tests
// Description: Unit tests for suffix assignment and lifecycle operations.
// Purpose: Validate idempotence, uniqueness, bounds, and rename/delete.
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

use std::collections::HashSet;
use std::sync::Arc;

use doi_gateway_core::DoiDataAccess;
use doi_gateway_store_sqlite::SqliteDataAccess;

use super::MAX_SUFFIX_DIGITS;
use super::ProjectSuffixRegistry;
use super::RegistryError;

fn registry() -> (ProjectSuffixRegistry, Arc<SqliteDataAccess>) {
    let store = Arc::new(SqliteDataAccess::open_in_memory().unwrap());
    (ProjectSuffixRegistry::new(Arc::clone(&store) as Arc<dyn DoiDataAccess>), store)
}

#[test]
fn a_new_name_gets_a_suffix_within_the_requested_width() {
    let (registry, _store) = registry();
    let suffix = registry.get_short_name("atmosphere", 6).unwrap();
    assert!(suffix > 0);
    assert!(suffix < 1_000_000);
    assert_eq!(registry.name_for_suffix(suffix).unwrap().as_deref(), Some("atmosphere"));
}

#[test]
fn assignment_is_idempotent_per_name() {
    let (registry, _store) = registry();
    let first = registry.get_short_name("atmosphere", 6).unwrap();
    let second = registry.get_short_name("atmosphere", 6).unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.list().unwrap().len(), 1);
}

#[test]
fn distinct_names_get_distinct_suffixes() {
    let (registry, _store) = registry();
    let mut seen = HashSet::new();
    for index in 0..20 {
        let suffix = registry.get_short_name(&format!("project-{index}"), 6).unwrap();
        assert!(seen.insert(suffix), "suffix {suffix} handed out twice");
    }
}

#[test]
fn a_tight_range_still_fills_without_duplicates() {
    let (registry, _store) = registry();
    let mut seen = HashSet::new();
    for index in 0..6 {
        let suffix = registry.get_short_name(&format!("p{index}"), 1).unwrap();
        assert!((1..10).contains(&suffix));
        assert!(seen.insert(suffix));
    }
}

#[test]
fn an_exhausted_range_reports_saturation() {
    let (registry, store) = registry();
    // Occupy every positive one-digit suffix up front.
    for suffix in 1..10 {
        store.create_project(suffix, &format!("taken-{suffix}")).unwrap();
    }
    let err = registry.get_short_name("one-too-many", 1).unwrap_err();
    assert!(matches!(err, RegistryError::Saturated(_)));
}

#[test]
fn the_digit_length_bounds_are_enforced() {
    let (registry, _store) = registry();
    assert!(matches!(
        registry.get_short_name("wide", MAX_SUFFIX_DIGITS + 1).unwrap_err(),
        RegistryError::DigitLengthTooLarge(10)
    ));
    assert!(matches!(
        registry.get_short_name("zero", 0).unwrap_err(),
        RegistryError::Invalid(_)
    ));
    assert!(matches!(
        registry.get_short_name("  ", 6).unwrap_err(),
        RegistryError::Invalid(_)
    ));
}

#[test]
fn rename_keeps_the_suffix_and_rejects_taken_names() {
    let (registry, _store) = registry();
    let suffix = registry.get_short_name("atmosphere", 6).unwrap();
    registry.get_short_name("ocean", 6).unwrap();

    registry.rename(suffix, "stratosphere").unwrap();
    assert_eq!(registry.suffix_for_name("stratosphere").unwrap(), Some(suffix));
    assert_eq!(registry.suffix_for_name("atmosphere").unwrap(), None);

    assert!(matches!(
        registry.rename(suffix, "ocean").unwrap_err(),
        RegistryError::Store(doi_gateway_core::StoreError::Conflict(_))
    ));
}

#[test]
fn delete_removes_the_project_and_frees_the_name() {
    let (registry, _store) = registry();
    let suffix = registry.get_short_name("atmosphere", 6).unwrap();
    registry.delete(suffix).unwrap();
    assert_eq!(registry.suffix_for_name("atmosphere").unwrap(), None);

    // The name may be registered again, with a fresh draw.
    let reassigned = registry.get_short_name("atmosphere", 6).unwrap();
    assert!(reassigned > 0);
}
