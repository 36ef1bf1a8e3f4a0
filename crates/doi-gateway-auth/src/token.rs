// crates/doi-gateway-auth/src/token.rs
// ============================================================================
// Module: Token Engine
// Description: EdDSA JWT issuance and verification with an injected clock.
// Purpose: Generate project-scoped bearer tokens and validate them fail-safe.
// Dependencies: doi-gateway-core, base64, ed25519-dalek, serde, serde_json
// ============================================================================

//! ## Overview
//! [`TokenEngine`] issues compact JWTs signed with Ed25519 and verifies
//! them against the same key. Claims carry the subject, an optional project
//! suffix scope, and issued-at/expiry instants computed from an injected
//! [`Clock`]. Verification distinguishes a bad signature from an expired
//! token; anything undecodable is treated as expired by [`TokenEngine::is_expired`],
//! so a corrupt token can never pass as live.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use doi_gateway_core::Clock;
use ed25519_dalek::Signature;
use ed25519_dalek::Signer;
use ed25519_dalek::SigningKey;
use ed25519_dalek::Verifier;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed JWT header for EdDSA-signed tokens.
const JWT_HEADER: &str = r#"{"alg":"EdDSA","typ":"JWT"}"#;
/// Required length of the Ed25519 signing-key seed in bytes.
pub const SIGNING_SEED_BYTES: usize = 32;
/// Length of an Ed25519 signature in bytes.
const SIGNATURE_BYTES: usize = 64;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Token engine errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The signing key seed could not be decoded or has the wrong length.
    #[error("signing material unavailable: {0}")]
    SigningUnavailable(String),
    /// The subject is missing.
    #[error("token subject is missing")]
    MissingSubject,
    /// The expiry parameters are out of range.
    #[error("invalid token expiry: {0}")]
    InvalidExpiry(String),
    /// The token is not a well-formed JWT.
    #[error("token is malformed: {0}")]
    Malformed(String),
    /// The signature does not verify against the engine key.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The token's expiry instant has passed.
    #[error("token is expired")]
    Expired,
}

// ============================================================================
// SECTION: Claims
// ============================================================================

/// Unit for token lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryUnit {
    /// One second.
    Second,
    /// Sixty seconds.
    Minute,
    /// Sixty minutes.
    Hour,
    /// Twenty-four hours.
    Day,
}

impl ExpiryUnit {
    /// Returns the unit length in seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }
}

/// Claims carried in a gateway token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject the token was issued to.
    pub sub: String,
    /// Optional project suffix the token is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<i32>,
    /// Issued-at instant, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry instant, seconds since the Unix epoch.
    pub exp: i64,
}

/// Decoded JWT header, used only to reject foreign algorithms.
#[derive(Debug, Deserialize)]
struct JwtHeader {
    /// Signature algorithm name.
    alg: String,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// EdDSA JWT engine bound to one signing key and one clock.
///
/// # Invariants
/// - Signature and expiry are the sole source of token validity; no
///   external lookup is consulted during verification.
pub struct TokenEngine {
    /// Ed25519 signing key; the verifying key is derived from it.
    signing_key: SigningKey,
    /// Clock used for issued-at and expiry decisions.
    clock: Arc<dyn Clock>,
}

impl TokenEngine {
    /// Creates an engine from a raw 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SigningUnavailable`] for a seed of the wrong
    /// length.
    pub fn from_seed(seed: &[u8], clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        let seed: [u8; SIGNING_SEED_BYTES] = seed.try_into().map_err(|_| {
            TokenError::SigningUnavailable(format!(
                "signing seed must be {SIGNING_SEED_BYTES} bytes, got {}",
                seed.len()
            ))
        })?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
            clock,
        })
    }

    /// Creates an engine from a base64-encoded 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SigningUnavailable`] when the seed does not
    /// decode or has the wrong length.
    pub fn from_base64_seed(encoded: &str, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        let seed = STANDARD
            .decode(encoded.trim())
            .map_err(|err| TokenError::SigningUnavailable(format!("seed is not base64: {err}")))?;
        Self::from_seed(&seed, clock)
    }

    /// Issues an unscoped token for a subject.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidExpiry`] for a zero amount or an expiry
    /// instant that overflows.
    pub fn generate(
        &self,
        subject: &str,
        unit: ExpiryUnit,
        amount: u32,
    ) -> Result<String, TokenError> {
        self.issue(subject, None, unit, amount)
    }

    /// Issues a token scoped to one project suffix.
    ///
    /// # Errors
    ///
    /// As [`Self::generate`].
    pub fn generate_scoped(
        &self,
        subject: &str,
        project_suffix: i32,
        unit: ExpiryUnit,
        amount: u32,
    ) -> Result<String, TokenError> {
        self.issue(subject, Some(project_suffix), unit, amount)
    }

    /// Verifies a token and returns its claims.
    ///
    /// Verification order is fixed: structure, signature, then expiry, so
    /// a forged token reports [`TokenError::InvalidSignature`] even when it
    /// is also expired.
    ///
    /// # Errors
    ///
    /// [`TokenError::Malformed`] for structural problems,
    /// [`TokenError::InvalidSignature`] for a signature mismatch, and
    /// [`TokenError::Expired`] once the expiry instant has passed.
    pub fn get_token_information(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed("token must have three segments".to_string()));
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|err| TokenError::Malformed(format!("header is not base64url: {err}")))?;
        let decoded_header: JwtHeader = serde_json::from_slice(&header_bytes)
            .map_err(|err| TokenError::Malformed(format!("header is not json: {err}")))?;
        if decoded_header.alg != "EdDSA" {
            return Err(TokenError::Malformed(format!(
                "unsupported algorithm: {}",
                decoded_header.alg
            )));
        }

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|err| TokenError::Malformed(format!("signature is not base64url: {err}")))?;
        let signature_bytes: [u8; SIGNATURE_BYTES] = signature_bytes.try_into().map_err(|_| {
            TokenError::Malformed(format!("signature must be {SIGNATURE_BYTES} bytes"))
        })?;
        let signature = Signature::from_bytes(&signature_bytes);
        let message = format!("{header}.{payload}");
        self.signing_key
            .verifying_key()
            .verify(message.as_bytes(), &signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|err| TokenError::Malformed(format!("payload is not base64url: {err}")))?;
        let claims: TokenClaims = serde_json::from_slice(&payload_bytes)
            .map_err(|err| TokenError::Malformed(format!("claims are not json: {err}")))?;

        if self.clock.now_unix_secs() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Returns true when the token must no longer be honored.
    ///
    /// Fail-safe: a token whose claims cannot be decoded or verified is
    /// reported expired.
    #[must_use]
    pub fn is_expired(&self, token: &str) -> bool {
        self.get_token_information(token).is_err()
    }

    /// Builds, signs, and encodes a token.
    fn issue(
        &self,
        subject: &str,
        project: Option<i32>,
        unit: ExpiryUnit,
        amount: u32,
    ) -> Result<String, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::MissingSubject);
        }
        if amount == 0 {
            return Err(TokenError::InvalidExpiry("expiry amount must be positive".to_string()));
        }
        let iat = self.clock.now_unix_secs();
        let lifetime = i64::from(amount)
            .checked_mul(unit.seconds())
            .ok_or_else(|| TokenError::InvalidExpiry("token lifetime overflows".to_string()))?;
        let exp = iat
            .checked_add(lifetime)
            .ok_or_else(|| TokenError::InvalidExpiry("expiry instant overflows".to_string()))?;

        let claims = TokenClaims {
            sub: subject.to_string(),
            project,
            iat,
            exp,
        };
        let payload = serde_json::to_string(&claims)
            .map_err(|err| TokenError::Malformed(format!("claims serialization failed: {err}")))?;
        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(JWT_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.signing_key.sign(message.as_bytes());
        Ok(format!("{message}.{}", URL_SAFE_NO_PAD.encode(signature.to_bytes())))
    }
}

#[cfg(test)]
mod tests;
