// crates/doi-gateway-registry/src/lib.rs
// ============================================================================
// Module: DOI Gateway Registry Library
// Description: Project-suffix assignment and user/role bookkeeping.
// Purpose: Expose the suffix registry and the user registry.
// Dependencies: crate::{suffix, users}
// ============================================================================

//! ## Overview
//! Two registries over the shared bookkeeping store: the suffix registry
//! maps project names to short numeric suffixes embedded in DOI names, and
//! the user registry manages users, admin flags, and user-project
//! assignments. The store is the single source of truth; no in-process
//! caches shadow it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod suffix;
pub mod users;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use suffix::MAX_SUFFIX_DIGITS;
pub use suffix::ProjectSuffixRegistry;
pub use suffix::RegistryError;
pub use users::UserRegistry;
