// crates/doi-gateway-registry/src/users.rs
// ============================================================================
// Module: User Registry
// Description: User, admin-flag, and project-assignment bookkeeping.
// Purpose: Manage gateway users and their project roles over the store seam.
// Dependencies: doi-gateway-core, crate::suffix
// ============================================================================

//! ## Overview
//! [`UserRegistry`] manages users and their many-to-many project
//! assignments directly on the bookkeeping store; there is no in-process
//! role cache. Mutations are all-or-nothing: deleting a user removes the
//! user row and every assignment in one store transaction. Removals are
//! announced through the injected [`Notifier`] so project administrators
//! learn of revoked access.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use doi_gateway_core::DoiDataAccess;
use doi_gateway_core::Notifier;
use doi_gateway_core::User;

use crate::suffix::RegistryError;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry of users, admin flags, and project assignments.
///
/// # Invariants
/// - The store is the single source of truth for roles; every check reads
///   it fresh.
pub struct UserRegistry {
    /// Bookkeeping store holding users and assignments.
    store: Arc<dyn DoiDataAccess>,
    /// Outbound notification seam.
    notifier: Arc<dyn Notifier>,
    /// Recipient for administrative notifications.
    contact: String,
}

impl UserRegistry {
    /// Creates a registry over the given store and notifier.
    #[must_use]
    pub fn new(
        store: Arc<dyn DoiDataAccess>,
        notifier: Arc<dyn Notifier>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            contact: contact.into(),
        }
    }

    /// Registers a user without admin rights.
    ///
    /// # Errors
    ///
    /// `Invalid` for an empty username, `Conflict` when the username is
    /// taken.
    pub fn add_user(&self, username: &str, email: Option<&str>) -> Result<(), RegistryError> {
        let username = required(username, "username")?;
        Ok(self.store.create_user(username, false, email)?)
    }

    /// Removes a user and every project assignment they hold.
    ///
    /// The removal is announced through the notifier after it committed;
    /// a delivery failure does not undo the removal.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown username.
    pub fn remove_user(&self, username: &str) -> Result<(), RegistryError> {
        let username = required(username, "username")?;
        let suffixes = self.store.projects_for_user(username)?;
        self.store.delete_user(username)?;
        let body = format!(
            "user {username} was removed and lost access to {} project(s)",
            suffixes.len()
        );
        let _ = self.notifier.notify("doi gateway user removed", &body, &self.contact);
        Ok(())
    }

    /// Sets or clears the admin flag.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown username.
    pub fn set_admin(&self, username: &str, admin: bool) -> Result<(), RegistryError> {
        Ok(self.store.set_admin(required(username, "username")?, admin)?)
    }

    /// Returns true when the user exists and is an administrator.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn is_admin(&self, username: &str) -> Result<bool, RegistryError> {
        Ok(self.store.is_admin(username)?)
    }

    /// Returns true when the user exists.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn user_exists(&self, username: &str) -> Result<bool, RegistryError> {
        Ok(self.store.user_exists(username)?)
    }

    /// Returns the user record, if any.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn find_user(&self, username: &str) -> Result<Option<User>, RegistryError> {
        Ok(self.store.find_user(username)?)
    }

    /// Lists every registered user.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn list_users(&self) -> Result<Vec<User>, RegistryError> {
        Ok(self.store.list_users()?)
    }

    /// Lists the usernames assigned to a project.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn users_for_project(&self, suffix: i32) -> Result<Vec<String>, RegistryError> {
        Ok(self.store.users_for_project(suffix)?)
    }

    /// Assigns a user to a project.
    ///
    /// # Errors
    ///
    /// `NotFound` when either side does not exist, `Conflict` when the
    /// assignment already exists.
    pub fn assign(&self, username: &str, suffix: i32) -> Result<(), RegistryError> {
        Ok(self.store.add_assignment(required(username, "username")?, suffix)?)
    }

    /// Removes a user-project assignment.
    ///
    /// # Errors
    ///
    /// `NotFound` when the assignment does not exist.
    pub fn unassign(&self, username: &str, suffix: i32) -> Result<(), RegistryError> {
        Ok(self.store.remove_assignment(required(username, "username")?, suffix)?)
    }

    /// Lists the project suffixes assigned to a user.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn projects_for_user(&self, username: &str) -> Result<Vec<i32>, RegistryError> {
        Ok(self.store.projects_for_user(username)?)
    }
}

/// Trims a field and rejects emptiness.
fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, RegistryError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RegistryError::Invalid(format!("{field} is required")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests;
