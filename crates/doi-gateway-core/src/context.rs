// crates/doi-gateway-core/src/context.rs
// ============================================================================
// Module: DOI Gateway Runtime Contexts
// Description: Runtime context policy for DOI registration environments.
// Purpose: Map each deployment stage to its upstream target and DOI rules.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every gateway instance runs in exactly one context. The context decides
//! which DataCite MDS endpoint is targeted, whether registrations are marked
//! as test-mode upstream, and whether DOI names have their institutional
//! prefix replaced with the DataCite test prefix before any network call.
//! Prod is the only context where both flags are off.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Production DataCite MDS endpoint.
const MDS_PROD_BASE_URL: &str = "https://mds.datacite.org";
/// Test DataCite MDS endpoint used by every non-production context.
const MDS_TEST_BASE_URL: &str = "https://mds.test.datacite.org";

// ============================================================================
// SECTION: Context
// ============================================================================

/// Runtime context for the gateway.
///
/// # Invariants
/// - `Prod` is the only variant with both `is_test_mode` and
///   `substitutes_prefix` false.
/// - Every non-production variant targets the DataCite test endpoint by
///   default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Context {
    /// Development sandbox.
    Dev,
    /// Post-development integration stage.
    PostDev,
    /// Pre-production rehearsal stage.
    PreProd,
    /// Production.
    Prod,
}

impl Context {
    /// Returns the default DataCite MDS base URL for this context.
    #[must_use]
    pub const fn mds_base_url(self) -> &'static str {
        match self {
            Self::Prod => MDS_PROD_BASE_URL,
            Self::Dev | Self::PostDev | Self::PreProd => MDS_TEST_BASE_URL,
        }
    }

    /// Returns true when registrations must carry the upstream test-mode
    /// marker (no persistent registration at DataCite).
    #[must_use]
    pub const fn is_test_mode(self) -> bool {
        !matches!(self, Self::Prod)
    }

    /// Returns true when DOI names must have their institutional prefix
    /// replaced with the DataCite test prefix before upstream calls.
    #[must_use]
    pub const fn substitutes_prefix(self) -> bool {
        !matches!(self, Self::Prod)
    }

    /// Returns the default log verbosity label for this context.
    #[must_use]
    pub const fn default_log_level(self) -> &'static str {
        match self {
            Self::Dev | Self::PostDev => "debug",
            Self::PreProd => "info",
            Self::Prod => "warn",
        }
    }

    /// Returns the stable context label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "DEV",
            Self::PostDev => "POST_DEV",
            Self::PreProd => "PRE_PROD",
            Self::Prod => "PROD",
        }
    }

    /// Parses a context label. Returns `None` for unknown labels.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "DEV" => Some(Self::Dev),
            "POST_DEV" => Some(Self::PostDev),
            "PRE_PROD" => Some(Self::PreProd),
            "PROD" => Some(Self::Prod),
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
