// crates/doi-gateway-auth/src/registry.rs
// ============================================================================
// Module: Token Registry
// Description: Persistence-backed bookkeeping of issued tokens.
// Purpose: Record issued tokens, drop them on logout, and list them for audit.
// Dependencies: doi-gateway-core
// ============================================================================

//! ## Overview
//! A side list of issued tokens kept in the bookkeeping store. The
//! cryptographic validity of a token is decided by signature and expiry
//! alone; this registry exists for logout revocation and audit listings,
//! and is not consulted during verification.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use doi_gateway_core::Clock;
use doi_gateway_core::DoiDataAccess;
use doi_gateway_core::StoreError;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Bookkeeping registry of issued tokens.
pub struct TokenRegistry {
    /// Store holding the token side list.
    store: Arc<dyn DoiDataAccess>,
    /// Clock stamping each recorded token.
    clock: Arc<dyn Clock>,
}

impl TokenRegistry {
    /// Creates a registry over the given store and clock.
    #[must_use]
    pub fn new(store: Arc<dyn DoiDataAccess>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
        }
    }

    /// Records an issued token with the current instant.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] for an empty token, [`StoreError::Conflict`]
    /// when the token is already recorded.
    pub fn record(&self, token: &str) -> Result<(), StoreError> {
        if token.trim().is_empty() {
            return Err(StoreError::Invalid("token must not be empty".to_string()));
        }
        self.store.add_token(token, self.clock.now_unix_secs())
    }

    /// Removes a token from the registry on logout.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the token was never recorded.
    pub fn revoke(&self, token: &str) -> Result<(), StoreError> {
        self.store.delete_token(token)
    }

    /// Returns true when the token is currently recorded.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn is_recorded(&self, token: &str) -> Result<bool, StoreError> {
        self.store.token_exists(token)
    }

    /// Lists every recorded token for audit purposes.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        self.store.list_tokens()
    }
}

#[cfg(test)]
mod tests;
