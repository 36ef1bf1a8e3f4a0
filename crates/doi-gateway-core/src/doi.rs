// crates/doi-gateway-core/src/doi.rs
// ============================================================================
// Module: DOI Name Policy
// Description: Validated DOI names with context-driven prefix substitution.
// Purpose: Keep every DOI that reaches the wire syntactically valid.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A DOI name has the shape `prefix/projectSuffix/localId[...]`. This module
//! validates the character set and institutional prefix at construction, so
//! downstream code can treat a [`DoiName`] as already vetted. Under any
//! non-production context the institutional prefix is replaced with the
//! DataCite test prefix before the name is used upstream; the substitution
//! is idempotent so an already-substituted name passes through unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::context::Context;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// DataCite test prefix substituted under non-production contexts.
pub const TEST_DOI_PREFIX: &str = "10.5072";

/// Maximum accepted DOI name length in bytes.
const MAX_DOI_LENGTH: usize = 2048;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// DOI name validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DoiError {
    /// The DOI name is empty.
    #[error("doi name is empty")]
    Empty,
    /// The DOI name exceeds the accepted length.
    #[error("doi name exceeds {MAX_DOI_LENGTH} bytes")]
    TooLong,
    /// The DOI name contains a character outside the accepted set.
    #[error("doi name contains invalid characters: {0}")]
    InvalidCharacters(String),
    /// The DOI name does not start with the configured prefix.
    #[error("doi name {doi} does not start with prefix {prefix}")]
    PrefixMismatch {
        /// Offending DOI name.
        doi: String,
        /// Expected institutional prefix.
        prefix: String,
    },
    /// The DOI name has no project suffix segment.
    #[error("doi name {0} has no project suffix segment")]
    MissingProjectSegment(String),
}

// ============================================================================
// SECTION: Character Validation
// ============================================================================

/// Returns true when every character of `value` belongs to the DOI set
/// `[0-9a-zA-Z\-._+:/\s]`, where `\s` is ASCII whitespace.
#[must_use]
pub fn all_chars_valid(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || c.is_ascii_whitespace()
                || matches!(c, '-' | '.' | '_' | '+' | ':' | '/')
        })
}

// ============================================================================
// SECTION: DOI Name
// ============================================================================

/// Validated DOI name.
///
/// # Invariants
/// - The character set is restricted to `[0-9a-zA-Z\-._+:/\s]`.
/// - The name starts with the institutional prefix it was parsed against,
///   or with [`TEST_DOI_PREFIX`] after substitution.
/// - A project suffix segment is always present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoiName(String);

impl DoiName {
    /// Parses and validates a DOI name against the institutional prefix.
    ///
    /// Names already carrying the DataCite test prefix are accepted so that
    /// substituted names survive a round trip through callers.
    ///
    /// # Errors
    ///
    /// Returns [`DoiError`] when the name is empty, oversized, contains
    /// characters outside the accepted set, does not start with the prefix,
    /// or lacks a project suffix segment.
    pub fn parse(raw: &str, institutional_prefix: &str) -> Result<Self, DoiError> {
        if raw.is_empty() {
            return Err(DoiError::Empty);
        }
        if raw.len() > MAX_DOI_LENGTH {
            return Err(DoiError::TooLong);
        }
        if !all_chars_valid(raw) {
            return Err(DoiError::InvalidCharacters(raw.to_string()));
        }
        let prefixed = !institutional_prefix.is_empty()
            && raw
                .strip_prefix(institutional_prefix)
                .is_some_and(|rest| rest.starts_with('/'));
        let test_prefixed =
            raw.strip_prefix(TEST_DOI_PREFIX).is_some_and(|rest| rest.starts_with('/'));
        if !prefixed && !test_prefixed {
            return Err(DoiError::PrefixMismatch {
                doi: raw.to_string(),
                prefix: institutional_prefix.to_string(),
            });
        }
        let name = Self(raw.to_string());
        if name.project_segment().is_none() {
            return Err(DoiError::MissingProjectSegment(raw.to_string()));
        }
        Ok(name)
    }

    /// Returns the DOI name with its prefix substituted per the context.
    ///
    /// Production never substitutes. For every other context the leading
    /// prefix segment is replaced with [`TEST_DOI_PREFIX`]; a name already
    /// carrying the test prefix is returned unchanged, which makes the
    /// substitution idempotent for a fixed context.
    #[must_use]
    pub fn substitute_prefix(&self, ctx: Context) -> Self {
        if !ctx.substitutes_prefix() {
            return self.clone();
        }
        match self.0.split_once('/') {
            Some((TEST_DOI_PREFIX, _)) | None => self.clone(),
            Some((_, rest)) => Self(format!("{TEST_DOI_PREFIX}/{rest}")),
        }
    }

    /// Returns the project suffix segment (the middle path segment).
    #[must_use]
    pub fn project_segment(&self) -> Option<&str> {
        self.0.split('/').nth(1).filter(|segment| !segment.is_empty())
    }

    /// Returns the `/`-split components of the DOI name.
    ///
    /// Upstream URL paths are built by appending each component as its own
    /// path segment, never by string concatenation.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Returns the DOI name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the DOI name and returns the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DoiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
