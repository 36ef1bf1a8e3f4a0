// crates/doi-gateway-auth/src/audit.rs
// ============================================================================
// Module: Auth Audit Sink
// Description: Structured allow/deny audit events with token fingerprints.
// Purpose: Record every authorization decision through an injected sink.
// Dependencies: serde, serde_json, sha2
// ============================================================================

//! ## Overview
//! Authorization decisions are emitted as structured events through an
//! [`AuditSink`] injected at construction. Tokens never appear in events in
//! the clear; they are reduced to SHA-256 hex fingerprints first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::sync::Mutex;

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Events
// ============================================================================

/// One authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthAuditEvent {
    /// Operation the decision was made for.
    pub action: String,
    /// Caller the decision applies to.
    pub username: String,
    /// DOI name under decision, when one is involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    /// Project role the decision resolved to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<i32>,
    /// Whether the operation was allowed.
    pub allowed: bool,
    /// Denial reason, empty on allow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// SHA-256 fingerprint of the presented token, when one was presented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_fingerprint: Option<String>,
}

/// Reduces a token to its SHA-256 hex fingerprint.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for authorization audit events.
pub trait AuditSink: Send + Sync {
    /// Records one decision; sinks must not fail the guarded operation.
    fn record(&self, event: &AuthAuditEvent);
}

/// Sink that writes JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuthAuditEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            eprintln!("{line}");
        }
    }
}

/// Sink that drops events, for callers that opt out of auditing.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuthAuditEvent) {}
}

/// Sink that collects events in memory, for tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<AuthAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AuthAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuthAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
