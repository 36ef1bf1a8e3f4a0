// crates/doi-gateway-core/src/interfaces.rs
// ============================================================================
// Module: Collaborator Interfaces
// Description: Data access, notifier, and clock seams for the gateway.
// Purpose: Keep service crates backend-agnostic and testable in isolation.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The gateway's service crates are written against these interfaces rather
//! than concrete backends: [`DoiDataAccess`] for project/user/token
//! bookkeeping, [`Notifier`] for outbound notifications, and [`Clock`] for
//! wall-clock reads. Implementations are injected at construction time;
//! there are no process-wide singletons.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Registered project: a human name bound to a numeric suffix.
///
/// # Invariants
/// - `suffix` is positive and unique; `name` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Numeric suffix embedded in DOI names.
    pub suffix: i32,
    /// Human project name.
    pub name: String,
}

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique username.
    pub username: String,
    /// Administrator flag.
    pub admin: bool,
    /// Optional contact email.
    pub email: Option<String>,
}

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Data access errors.
///
/// A missing row is reported as `Ok(None)`/`Ok(false)` by lookups; the
/// `NotFound` variant is reserved for mutations that require presence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Mutation target does not exist.
    #[error("store record not found: {0}")]
    NotFound(String),
    /// Uniqueness constraint violated.
    #[error("store conflict: {0}")]
    Conflict(String),
    /// Invalid value handed to the store.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Backing engine failure.
    #[error("store failure: {0}")]
    Storage(String),
}

// ============================================================================
// SECTION: Data Access
// ============================================================================

/// Bookkeeping store for projects, users, assignments, and tokens.
///
/// # Invariants
/// - Mutations are all-or-nothing; no partial rows survive a failure.
/// - `create_project` performs its uniqueness check and insert atomically
///   with respect to other callers (the suffix-registry critical section).
pub trait DoiDataAccess: Send + Sync {
    /// Returns the suffix assigned to a project name, if any.
    fn project_suffix_for_name(&self, name: &str) -> Result<Option<i32>, StoreError>;

    /// Returns the project name assigned to a suffix, if any.
    fn project_name_for_suffix(&self, suffix: i32) -> Result<Option<String>, StoreError>;

    /// Atomically registers a project; fails with [`StoreError::Conflict`]
    /// when the suffix or name is already taken.
    fn create_project(&self, suffix: i32, name: &str) -> Result<(), StoreError>;

    /// Renames an existing project.
    fn rename_project(&self, suffix: i32, new_name: &str) -> Result<(), StoreError>;

    /// Deletes a project and its assignments.
    fn delete_project(&self, suffix: i32) -> Result<(), StoreError>;

    /// Lists all registered projects.
    fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Creates a user.
    fn create_user(&self, username: &str, admin: bool, email: Option<&str>)
    -> Result<(), StoreError>;

    /// Deletes a user and their assignments.
    fn delete_user(&self, username: &str) -> Result<(), StoreError>;

    /// Returns true when the user exists.
    fn user_exists(&self, username: &str) -> Result<bool, StoreError>;

    /// Sets or clears the admin flag.
    fn set_admin(&self, username: &str, admin: bool) -> Result<(), StoreError>;

    /// Returns true when the user exists and is an administrator.
    fn is_admin(&self, username: &str) -> Result<bool, StoreError>;

    /// Lists all users.
    fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Returns the user record, if any.
    fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Lists the usernames assigned to a project.
    fn users_for_project(&self, suffix: i32) -> Result<Vec<String>, StoreError>;

    /// Assigns a user to a project.
    fn add_assignment(&self, username: &str, suffix: i32) -> Result<(), StoreError>;

    /// Removes a user-project assignment.
    fn remove_assignment(&self, username: &str, suffix: i32) -> Result<(), StoreError>;

    /// Lists the project suffixes assigned to a user.
    fn projects_for_user(&self, username: &str) -> Result<Vec<i32>, StoreError>;

    /// Records a generated token string.
    fn add_token(&self, token: &str, created_at: i64) -> Result<(), StoreError>;

    /// Removes a token from the registry.
    fn delete_token(&self, token: &str) -> Result<(), StoreError>;

    /// Returns true when the token is recorded.
    fn token_exists(&self, token: &str) -> Result<bool, StoreError>;

    /// Lists all recorded token strings.
    fn list_tokens(&self) -> Result<Vec<String>, StoreError>;
}

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notification could not be delivered.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Outbound notification seam (subject, body, recipient).
pub trait Notifier: Send + Sync {
    /// Delivers a notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails.
    fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError>;
}

/// Notifier that writes JSON lines to stderr.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "event": "notification",
            "subject": subject,
            "body": body,
            "recipient": recipient,
        });
        eprintln!("{payload}");
        Ok(())
    }
}

/// No-op notifier for tests.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _subject: &str, _body: &str, _recipient: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock seam; services never read system time directly.
pub trait Clock: Send + Sync {
    /// Returns seconds since the Unix epoch.
    fn now_unix_secs(&self) -> i64;
}

/// System wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
    }
}

/// Manually advanced clock for tests and replay.
#[derive(Clone, Default)]
pub struct ManualClock {
    /// Current time in seconds since the Unix epoch.
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a manual clock set to the given epoch seconds.
    #[must_use]
    pub fn new(now_unix_secs: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_unix_secs)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, now_unix_secs: i64) {
        self.now.store(now_unix_secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
