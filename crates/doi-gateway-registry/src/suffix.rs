// crates/doi-gateway-registry/src/suffix.rs
// ============================================================================
// Module: Project Suffix Registry
// Description: Short numeric suffix assignment for project names.
// Purpose: Draw, reserve, and look up the suffixes embedded in DOI names.
// Dependencies: doi-gateway-core, rand
// ============================================================================

//! ## Overview
//! Every project gets a short numeric suffix that becomes the middle path
//! segment of its DOI names. [`ProjectSuffixRegistry::get_short_name`] is
//! idempotent: a name that already holds a suffix gets the same suffix
//! back. A new name draws a fresh random value in `[0, 10^digit_length)`
//! mixed with the name's hash, and reserves it through the store's atomic
//! check-then-insert. Collisions retry with fresh randomness up to a fixed
//! attempt bound, after which the registry reports saturation instead of
//! spinning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::hash::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use doi_gateway_core::DoiDataAccess;
use doi_gateway_core::Project;
use doi_gateway_core::StoreError;
use rand::Rng;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest supported suffix width in decimal digits.
///
/// `10^9` still fits an `i32`; anything wider cannot be represented.
pub const MAX_SUFFIX_DIGITS: u32 = 9;
/// Collision retries before the registry reports saturation.
const MAX_DRAW_ATTEMPTS: u32 = 64;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Invalid input handed to the registry.
    #[error("invalid registry input: {0}")]
    Invalid(String),
    /// The requested suffix width cannot be represented.
    #[error("digit length {0} exceeds the {MAX_SUFFIX_DIGITS}-digit suffix bound")]
    DigitLengthTooLarge(u32),
    /// No free suffix was found within the attempt bound.
    #[error("suffix registry saturated after {0} attempts")]
    Saturated(u32),
    /// Store failure underneath the registry.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry assigning short numeric suffixes to project names.
///
/// # Invariants
/// - Suffixes and names are unique; uniqueness is enforced by the store's
///   atomic insert, not by a pre-check.
/// - Assignment is idempotent per name.
pub struct ProjectSuffixRegistry {
    /// Bookkeeping store holding the project table.
    store: Arc<dyn DoiDataAccess>,
}

impl ProjectSuffixRegistry {
    /// Creates a registry over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DoiDataAccess>) -> Self {
        Self {
            store,
        }
    }

    /// Returns the suffix for a project name, assigning one if needed.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DigitLengthTooLarge`] for a width past the `i32`
    /// bound, [`RegistryError::Saturated`] when no free suffix is found
    /// within the attempt bound.
    pub fn get_short_name(&self, name: &str, digit_length: u32) -> Result<i32, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::Invalid("project name is required".to_string()));
        }
        if digit_length == 0 {
            return Err(RegistryError::Invalid("digit length must be positive".to_string()));
        }
        if digit_length > MAX_SUFFIX_DIGITS {
            return Err(RegistryError::DigitLengthTooLarge(digit_length));
        }
        if let Some(existing) = self.store.project_suffix_for_name(name)? {
            return Ok(existing);
        }

        let range = 10_u32.pow(digit_length);
        let fold = fold_hash(name);
        let mut rng = rand::thread_rng();
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let drawn: u32 = rng.gen_range(0..range);
            let mixed = (drawn ^ fold) % range;
            // Suffixes are positive; zero draws again.
            let Ok(candidate) = i32::try_from(mixed) else {
                continue;
            };
            if candidate == 0 {
                continue;
            }
            match self.store.create_project(candidate, name) {
                Ok(()) => return Ok(candidate),
                Err(StoreError::Conflict(_)) => {
                    // Either the suffix is taken or another caller just
                    // registered this name; the latter is the idempotent case.
                    if let Some(existing) = self.store.project_suffix_for_name(name)? {
                        return Ok(existing);
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(RegistryError::Saturated(MAX_DRAW_ATTEMPTS))
    }

    /// Returns the suffix held by a name, if any.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn suffix_for_name(&self, name: &str) -> Result<Option<i32>, RegistryError> {
        Ok(self.store.project_suffix_for_name(name.trim())?)
    }

    /// Returns the name holding a suffix, if any.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn name_for_suffix(&self, suffix: i32) -> Result<Option<String>, RegistryError> {
        Ok(self.store.project_name_for_suffix(suffix)?)
    }

    /// Lists every registered project.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn list(&self) -> Result<Vec<Project>, RegistryError> {
        Ok(self.store.list_projects()?)
    }

    /// Renames a project, keeping its suffix.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown suffix, `Conflict` when the new name is
    /// already taken.
    pub fn rename(&self, suffix: i32, new_name: &str) -> Result<(), RegistryError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(RegistryError::Invalid("project name is required".to_string()));
        }
        Ok(self.store.rename_project(suffix, new_name)?)
    }

    /// Deletes a project and its assignments.
    ///
    /// Callers must first confirm upstream that no DOIs are registered
    /// under the project; the registry itself only removes bookkeeping.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown suffix.
    pub fn delete(&self, suffix: i32) -> Result<(), RegistryError> {
        Ok(self.store.delete_project(suffix)?)
    }
}

/// Folds a name's 64-bit hash into 32 bits of mixing entropy.
fn fold_hash(name: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    let hash = hasher.finish();
    u32::try_from((hash ^ (hash >> 32)) & u64::from(u32::MAX)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests;
