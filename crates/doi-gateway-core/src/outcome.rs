// crates/doi-gateway-core/src/outcome.rs
// ============================================================================
// Module: Upstream Outcome Taxonomy
// Description: Closed classification of DataCite MDS call outcomes.
// Purpose: Give callers a stable enum to branch on instead of raw statuses.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every MDS call resolves to exactly one [`ApiOutcome`]. Callers branch on
//! the outcome, so the taxonomy is closed and its variants are stable.
//! [`MdsError`] pairs a non-success outcome with the upstream HTTP status
//! and description when one exists, preserving enough context to
//! reconstruct the cause without re-running the operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Outcome Taxonomy
// ============================================================================

/// Closed outcome classification for upstream MDS calls.
///
/// # Invariants
/// - Variants are stable; resource layers and clients branch on them.
/// - Every HTTP status maps to exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiOutcome {
    /// Operation succeeded with a body.
    Success,
    /// DOI is known upstream but carries no content (registered, unresolved).
    SuccessNoContent,
    /// Request was malformed (validation failure, missing field).
    BadRequest,
    /// Credentials missing or wrong.
    Unauthorized,
    /// Caller may not act on this DOI prefix/dataset.
    Forbidden,
    /// DOI does not exist upstream.
    DoiNotFound,
    /// DOI metadata exists but has been marked inactive.
    DoiInactive,
    /// Metadata must be uploaded before DOI registration.
    PreconditionFailed,
    /// Transport failure or unclassified upstream problem.
    InternalError,
}

impl ApiOutcome {
    /// Classifies an upstream HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            200 | 201 => Self::Success,
            204 => Self::SuccessNoContent,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::DoiNotFound,
            410 => Self::DoiInactive,
            412 => Self::PreconditionFailed,
            _ => Self::InternalError,
        }
    }

    /// Returns true for the two success variants.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::SuccessNoContent)
    }

    /// Returns the stable outcome label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::SuccessNoContent => "SUCCESS_NO_CONTENT",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::DoiNotFound => "DOI_NOT_FOUND",
            Self::DoiInactive => "DOI_INACTIVE",
            Self::PreconditionFailed => "PRECONDITION_FAILED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

// ============================================================================
// SECTION: MDS Error
// ============================================================================

/// Classified failure of an upstream MDS operation.
///
/// # Invariants
/// - `outcome` is never a success variant.
/// - `status` is present iff the upstream answered with an HTTP status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("mds {} (status {status:?}): {message}", .outcome.as_str())]
pub struct MdsError {
    /// Classified outcome.
    outcome: ApiOutcome,
    /// Upstream HTTP status when one was received.
    status: Option<u16>,
    /// Upstream description or local failure detail.
    message: String,
}

impl MdsError {
    /// Builds a local validation error (no upstream round trip happened).
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            outcome: ApiOutcome::BadRequest,
            status: None,
            message: message.into(),
        }
    }

    /// Builds a transport or internal error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            outcome: ApiOutcome::InternalError,
            status: None,
            message: message.into(),
        }
    }

    /// Classifies an upstream non-success status, preserving it verbatim.
    #[must_use]
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self {
            outcome: ApiOutcome::from_status(status),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Returns the classified outcome.
    #[must_use]
    pub const fn outcome(&self) -> ApiOutcome {
        self.outcome
    }

    /// Returns the upstream HTTP status when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the preserved upstream description or local detail.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
