// crates/doi-gateway-auth/src/permission.rs
// ============================================================================
// Module: Permission Checker
// Description: Role-based authorization for DOI mutations.
// Purpose: Bind a caller's project roles to the project segment of a DOI.
// Dependencies: doi-gateway-core, crate::audit
// ============================================================================

//! ## Overview
//! A role is a project suffix granted to a user through an assignment row.
//! Before any metadata or media mutation the checker resolves the caller's
//! effective role and requires it to equal the project segment embedded in
//! the DOI name. An explicitly selected role must be among the caller's
//! grants; with no selection, a single grant is auto-selected and anything
//! else is an ambiguity conflict. Read-only operations are not checked.
//! Every decision is recorded through the injected [`AuditSink`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use doi_gateway_core::DoiDataAccess;
use doi_gateway_core::DoiName;
use doi_gateway_core::StoreError;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::AuthAuditEvent;
use crate::audit::token_fingerprint;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authorization errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionError {
    /// The caller may not perform the operation.
    #[error("operation not authorized: {0}")]
    Unauthorized(String),
    /// The role selection is ambiguous and must be made explicit.
    #[error("role selection is ambiguous: {0}")]
    Conflict(String),
    /// The role lookup failed in the store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Checker
// ============================================================================

/// Role-based authorization gate for DOI mutations.
///
/// # Invariants
/// - Grants are read from the store on every check; there is no cached
///   role state to fall out of date.
pub struct PermissionChecker {
    /// Bookkeeping store holding user-project assignments.
    store: Arc<dyn DoiDataAccess>,
    /// Sink receiving one event per decision.
    audit: Arc<dyn AuditSink>,
}

impl PermissionChecker {
    /// Creates a checker over the given store and audit sink.
    #[must_use]
    pub fn new(store: Arc<dyn DoiDataAccess>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            audit,
        }
    }

    /// Authorizes a DOI mutation and returns the resolved role.
    ///
    /// # Errors
    ///
    /// [`PermissionError::Unauthorized`] when the selected role is not
    /// granted or does not match the DOI's project segment;
    /// [`PermissionError::Conflict`] when no selection was made and the
    /// caller holds zero or several roles.
    pub fn check(
        &self,
        username: &str,
        doi: &DoiName,
        selected_role: Option<i32>,
    ) -> Result<i32, PermissionError> {
        self.evaluate(username, doi, selected_role, None)
    }

    /// As [`Self::check`], recording the presented token's fingerprint in
    /// the audit trail.
    ///
    /// # Errors
    ///
    /// As [`Self::check`].
    pub fn check_with_token(
        &self,
        username: &str,
        doi: &DoiName,
        selected_role: Option<i32>,
        token: &str,
    ) -> Result<i32, PermissionError> {
        self.evaluate(username, doi, selected_role, Some(token))
    }

    /// Resolves the effective role and compares it to the DOI project.
    fn evaluate(
        &self,
        username: &str,
        doi: &DoiName,
        selected_role: Option<i32>,
        token: Option<&str>,
    ) -> Result<i32, PermissionError> {
        let granted = self.store.projects_for_user(username)?;

        let resolved = match selected_role {
            Some(role) => {
                if !granted.contains(&role) {
                    return Err(self.deny(
                        username,
                        doi,
                        Some(role),
                        token,
                        PermissionError::Unauthorized(format!(
                            "role {role} is not granted to {username}"
                        )),
                    ));
                }
                role
            }
            None => match granted.as_slice() {
                [only] => *only,
                [] => {
                    return Err(self.deny(
                        username,
                        doi,
                        None,
                        token,
                        PermissionError::Conflict(format!("{username} holds no role")),
                    ));
                }
                _ => {
                    return Err(self.deny(
                        username,
                        doi,
                        None,
                        token,
                        PermissionError::Conflict(format!(
                            "{username} holds {} roles and selected none",
                            granted.len()
                        )),
                    ));
                }
            },
        };

        let doi_project = doi.project_segment().and_then(|segment| segment.parse::<i32>().ok());
        if doi_project != Some(resolved) {
            return Err(self.deny(
                username,
                doi,
                Some(resolved),
                token,
                PermissionError::Unauthorized(format!(
                    "role {resolved} does not match the project of {}",
                    doi.as_str()
                )),
            ));
        }

        self.audit.record(&AuthAuditEvent {
            action: "doi_mutation".to_string(),
            username: username.to_string(),
            doi: Some(doi.as_str().to_string()),
            role: Some(resolved),
            allowed: true,
            reason: None,
            token_fingerprint: token.map(token_fingerprint),
        });
        Ok(resolved)
    }

    /// Records a denial and hands the error back for propagation.
    fn deny(
        &self,
        username: &str,
        doi: &DoiName,
        role: Option<i32>,
        token: Option<&str>,
        error: PermissionError,
    ) -> PermissionError {
        self.audit.record(&AuthAuditEvent {
            action: "doi_mutation".to_string(),
            username: username.to_string(),
            doi: Some(doi.as_str().to_string()),
            role,
            allowed: false,
            reason: Some(error.to_string()),
            token_fingerprint: token.map(token_fingerprint),
        });
        error
    }
}

#[cfg(test)]
mod tests;
