// crates/doi-gateway-config/src/lib.rs
// ============================================================================
// Module: DOI Gateway Configuration Library
// Description: Fail-closed TOML configuration loading and validation.
// Purpose: Expose the gateway configuration and its component builders.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits and validated fail-closed before any component is constructed.
//! Validated sections convert directly into the client, store, and token
//! engine configurations of the other gateway crates.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::ContextSection;
pub use config::CrossCiteSection;
pub use config::GatewayConfig;
pub use config::MdsSection;
pub use config::NotifierSection;
pub use config::SearchSection;
pub use config::TokenSection;

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
