// crates/doi-gateway-auth/src/token/tests.rs
// ============================================================================
// Module: Token Engine Tests
// Description: Unit tests for EdDSA token issuance and verification.
// Purpose: Validate round trips, tampering detection, and fail-safe expiry.
// Dependencies: doi-gateway-core (ManualClock)
// ============================================================================

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

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use doi_gateway_core::ManualClock;

use super::ExpiryUnit;
use super::SIGNING_SEED_BYTES;
use super::TokenEngine;
use super::TokenError;

const NOW: i64 = 1_700_000_000;

fn engine_with_clock(seed_byte: u8) -> (TokenEngine, ManualClock) {
    let clock = ManualClock::new(NOW);
    let seed = [seed_byte; SIGNING_SEED_BYTES];
    let engine = TokenEngine::from_seed(&seed, Arc::new(clock.clone())).unwrap();
    (engine, clock)
}

#[test]
fn round_trip_preserves_the_claims() {
    let (engine, _clock) = engine_with_clock(7);
    let token = engine.generate("alice", ExpiryUnit::Hour, 2).unwrap();
    let claims = engine.get_token_information(&token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.project, None);
    assert_eq!(claims.iat, NOW);
    assert_eq!(claims.exp, NOW + 2 * 3_600);
}

#[test]
fn scoped_tokens_carry_the_project_suffix() {
    let (engine, _clock) = engine_with_clock(7);
    let token = engine.generate_scoped("alice", 329_360, ExpiryUnit::Day, 1).unwrap();
    let claims = engine.get_token_information(&token).unwrap();
    assert_eq!(claims.project, Some(329_360));
    assert_eq!(claims.exp, NOW + 86_400);
}

#[test]
fn expiry_unit_lengths_are_fixed() {
    assert_eq!(ExpiryUnit::Second.seconds(), 1);
    assert_eq!(ExpiryUnit::Minute.seconds(), 60);
    assert_eq!(ExpiryUnit::Hour.seconds(), 3_600);
    assert_eq!(ExpiryUnit::Day.seconds(), 86_400);
}

#[test]
fn a_token_expires_when_the_clock_passes_exp() {
    let (engine, clock) = engine_with_clock(7);
    let token = engine.generate("alice", ExpiryUnit::Minute, 5).unwrap();
    assert!(!engine.is_expired(&token));

    clock.advance(5 * 60 - 1);
    assert!(!engine.is_expired(&token));

    clock.advance(1);
    assert!(engine.is_expired(&token));
    assert_eq!(engine.get_token_information(&token).unwrap_err(), TokenError::Expired);
}

#[test]
fn a_tampered_payload_fails_the_signature_check() {
    let (engine, _clock) = engine_with_clock(7);
    let token = engine.generate("alice", ExpiryUnit::Hour, 1).unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    let forged_claims = format!(
        r#"{{"sub":"mallory","iat":{NOW},"exp":{}}}"#,
        NOW + 3_600
    );
    let forged = format!(
        "{}.{}.{}",
        parts[0],
        URL_SAFE_NO_PAD.encode(forged_claims),
        parts[2]
    );
    assert_eq!(
        engine.get_token_information(&forged).unwrap_err(),
        TokenError::InvalidSignature
    );
}

#[test]
fn a_foreign_key_fails_the_signature_check() {
    let (issuer, _clock) = engine_with_clock(7);
    let (verifier, _clock) = engine_with_clock(8);
    let token = issuer.generate("alice", ExpiryUnit::Hour, 1).unwrap();
    assert_eq!(
        verifier.get_token_information(&token).unwrap_err(),
        TokenError::InvalidSignature
    );
}

#[test]
fn structural_garbage_is_malformed_and_treated_expired() {
    let (engine, _clock) = engine_with_clock(7);
    for garbage in ["", "not-a-token", "a.b", "a.b.c.d", "!!.!!.!!"] {
        assert!(
            matches!(engine.get_token_information(garbage), Err(TokenError::Malformed(_))),
            "expected malformed for {garbage:?}"
        );
        assert!(engine.is_expired(garbage), "garbage must be treated expired");
    }
}

#[test]
fn a_foreign_algorithm_is_rejected() {
    let (engine, _clock) = engine_with_clock(7);
    let token = engine.generate("alice", ExpiryUnit::Hour, 1).unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let forged = format!("{header}.{}.{}", parts[1], parts[2]);
    assert!(matches!(
        engine.get_token_information(&forged),
        Err(TokenError::Malformed(_))
    ));
}

#[test]
fn issuance_validates_subject_and_amount() {
    let (engine, _clock) = engine_with_clock(7);
    assert_eq!(
        engine.generate("  ", ExpiryUnit::Hour, 1).unwrap_err(),
        TokenError::MissingSubject
    );
    assert!(matches!(
        engine.generate("alice", ExpiryUnit::Hour, 0).unwrap_err(),
        TokenError::InvalidExpiry(_)
    ));
}

#[test]
fn seed_decoding_failures_are_signing_unavailable() {
    let clock: Arc<dyn doi_gateway_core::Clock> = Arc::new(ManualClock::new(NOW));
    assert!(matches!(
        TokenEngine::from_seed(&[0_u8; 16], Arc::clone(&clock)),
        Err(TokenError::SigningUnavailable(_))
    ));
    assert!(matches!(
        TokenEngine::from_base64_seed("%%%not-base64%%%", Arc::clone(&clock)),
        Err(TokenError::SigningUnavailable(_))
    ));
    let short = STANDARD.encode([0_u8; 8]);
    assert!(matches!(
        TokenEngine::from_base64_seed(&short, clock),
        Err(TokenError::SigningUnavailable(_))
    ));
}

#[test]
fn base64_seeds_round_trip() {
    let clock = Arc::new(ManualClock::new(NOW));
    let encoded = STANDARD.encode([9_u8; SIGNING_SEED_BYTES]);
    let engine = TokenEngine::from_base64_seed(&encoded, clock).unwrap();
    let token = engine.generate("alice", ExpiryUnit::Second, 30).unwrap();
    assert_eq!(engine.get_token_information(&token).unwrap().sub, "alice");
}
