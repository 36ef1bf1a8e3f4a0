// crates/doi-gateway-mds/src/lib.rs
// ============================================================================
// Module: DOI Gateway MDS Library
// Description: Upstream client adapters for DataCite and CrossCite.
// Purpose: Expose the MDS protocol adapter and read-only citation/search clients.
// Dependencies: crate::{citation, client, search}
// ============================================================================

//! ## Overview
//! This crate translates gateway operations into upstream HTTP calls: the
//! DataCite MDS protocol adapter (DOI registration, metadata and media CRUD)
//! plus thin read-only clients for CrossCite citation formatting and the
//! DataCite Search API. Every outcome is classified into the closed
//! taxonomy defined by `doi-gateway-core`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod citation;
pub mod client;
pub mod search;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use citation::CrossCiteClient;
pub use citation::CrossCiteConfig;
pub use client::ClientMds;
pub use client::ClientMdsConfig;
pub use client::MdsCredentials;
pub use search::DataCiteSearchClient;
pub use search::DataCiteSearchConfig;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
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
}
