// crates/doi-gateway-auth/src/lib.rs
// ============================================================================
// Module: DOI Gateway Auth Library
// Description: Token issuance, permission checks, and auth auditing.
// Purpose: Expose the token engine, token registry, and permission checker.
// Dependencies: crate::{audit, permission, registry, token}
// ============================================================================

//! ## Overview
//! Authentication and authorization for the gateway: an EdDSA JWT token
//! engine with injectable clock, a persistence-backed token registry for
//! revocation bookkeeping, and a permission checker binding a caller's
//! project roles to the project segment embedded in each DOI name. Every
//! allow/deny decision is emitted through an injected audit sink.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod permission;
pub mod registry;
pub mod token;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::AuthAuditEvent;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::token_fingerprint;
pub use permission::PermissionChecker;
pub use permission::PermissionError;
pub use registry::TokenRegistry;
pub use token::ExpiryUnit;
pub use token::SIGNING_SEED_BYTES;
pub use token::TokenClaims;
pub use token::TokenEngine;
pub use token::TokenError;

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
