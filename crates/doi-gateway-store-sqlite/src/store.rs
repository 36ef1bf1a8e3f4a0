// crates/doi-gateway-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Data Access
// Description: Durable DoiDataAccess backed by SQLite WAL.
// Purpose: Persist projects, users, assignments, and token bookkeeping.
// Dependencies: doi-gateway-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements the core `DoiDataAccess` interface over a single
//! `SQLite` connection guarded by a mutex. Every mutation runs in an
//! explicit transaction, which makes the project-suffix check-then-insert
//! atomic with respect to other callers and keeps multi-row writes
//! (user deletion, project deletion) all-or-nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use doi_gateway_core::DoiDataAccess;
use doi_gateway_core::Project;
use doi_gateway_core::StoreError;
use doi_gateway_core::User;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` data access store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Uniqueness constraint violation.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Mutation target missing.
    #[error("sqlite store record not found: {0}")]
    NotFound(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) | SqliteStoreError::Db(message) => Self::Storage(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::VersionMismatch(message) | SqliteStoreError::Invalid(message) => {
                Self::Invalid(message)
            }
        }
    }
}

/// Maps a rusqlite error, classifying uniqueness violations as conflicts.
fn map_db_error(context: &str, err: &rusqlite::Error) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            return SqliteStoreError::Conflict(format!("{context}: {err}"));
        }
    }
    SqliteStoreError::Db(format!("{context}: {err}"))
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed data access store.
#[derive(Clone)]
pub struct SqliteDataAccess {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteDataAccess {
    /// Opens an `SQLite`-backed data access store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let connection = open_connection(config)?;
        initialize_schema(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Opens an in-memory store (testing and ephemeral deployments).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be created.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        connection
            .pragma_update(None, "foreign_keys", "on")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        initialize_schema(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Runs a closure inside a transaction on the guarded connection.
    fn with_tx<T>(
        &self,
        operation: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let value = operation(&tx)?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(value)
    }
}

// ============================================================================
// SECTION: Data Access Implementation
// ============================================================================

impl DoiDataAccess for SqliteDataAccess {
    fn project_suffix_for_name(&self, name: &str) -> Result<Option<i32>, StoreError> {
        self.with_tx(|tx| {
            tx.query_row(
                "SELECT suffix FROM projects WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| map_db_error("project lookup by name", &err))
        })
        .map_err(StoreError::from)
    }

    fn project_name_for_suffix(&self, suffix: i32) -> Result<Option<String>, StoreError> {
        self.with_tx(|tx| {
            tx.query_row(
                "SELECT name FROM projects WHERE suffix = ?1",
                params![suffix],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| map_db_error("project lookup by suffix", &err))
        })
        .map_err(StoreError::from)
    }

    fn create_project(&self, suffix: i32, name: &str) -> Result<(), StoreError> {
        if suffix <= 0 {
            return Err(StoreError::Invalid(format!("project suffix must be positive: {suffix}")));
        }
        if name.trim().is_empty() {
            return Err(StoreError::Invalid("project name is empty".to_string()));
        }
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO projects (suffix, name) VALUES (?1, ?2)",
                params![suffix, name],
            )
            .map_err(|err| map_db_error("project insert", &err))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn rename_project(&self, suffix: i32, new_name: &str) -> Result<(), StoreError> {
        if new_name.trim().is_empty() {
            return Err(StoreError::Invalid("project name is empty".to_string()));
        }
        self.with_tx(|tx| {
            let updated = tx
                .execute(
                    "UPDATE projects SET name = ?2 WHERE suffix = ?1",
                    params![suffix, new_name],
                )
                .map_err(|err| map_db_error("project rename", &err))?;
            if updated == 0 {
                return Err(SqliteStoreError::NotFound(format!("project suffix {suffix}")));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn delete_project(&self, suffix: i32) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM assignments WHERE suffix = ?1", params![suffix])
                .map_err(|err| map_db_error("assignment cleanup", &err))?;
            let deleted = tx
                .execute("DELETE FROM projects WHERE suffix = ?1", params![suffix])
                .map_err(|err| map_db_error("project delete", &err))?;
            if deleted == 0 {
                return Err(SqliteStoreError::NotFound(format!("project suffix {suffix}")));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare("SELECT suffix, name FROM projects ORDER BY suffix")
                .map_err(|err| map_db_error("project list", &err))?;
            let rows = statement
                .query_map([], |row| {
                    Ok(Project {
                        suffix: row.get(0)?,
                        name: row.get(1)?,
                    })
                })
                .map_err(|err| map_db_error("project list", &err))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|err| map_db_error("project list", &err))
        })
        .map_err(StoreError::from)
    }

    fn create_user(
        &self,
        username: &str,
        admin: bool,
        email: Option<&str>,
    ) -> Result<(), StoreError> {
        if username.trim().is_empty() {
            return Err(StoreError::Invalid("username is empty".to_string()));
        }
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (username, admin, email) VALUES (?1, ?2, ?3)",
                params![username, i64::from(admin), email],
            )
            .map_err(|err| map_db_error("user insert", &err))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn delete_user(&self, username: &str) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM assignments WHERE username = ?1", params![username])
                .map_err(|err| map_db_error("assignment cleanup", &err))?;
            let deleted = tx
                .execute("DELETE FROM users WHERE username = ?1", params![username])
                .map_err(|err| map_db_error("user delete", &err))?;
            if deleted == 0 {
                return Err(SqliteStoreError::NotFound(format!("user {username}")));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        self.find_user(username).map(|user| user.is_some())
    }

    fn set_admin(&self, username: &str, admin: bool) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let updated = tx
                .execute(
                    "UPDATE users SET admin = ?2 WHERE username = ?1",
                    params![username, i64::from(admin)],
                )
                .map_err(|err| map_db_error("admin update", &err))?;
            if updated == 0 {
                return Err(SqliteStoreError::NotFound(format!("user {username}")));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn is_admin(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.find_user(username)?.is_some_and(|user| user.admin))
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare("SELECT username, admin, email FROM users ORDER BY username")
                .map_err(|err| map_db_error("user list", &err))?;
            let rows = statement
                .query_map([], |row| {
                    Ok(User {
                        username: row.get(0)?,
                        admin: row.get::<_, i64>(1)? != 0,
                        email: row.get(2)?,
                    })
                })
                .map_err(|err| map_db_error("user list", &err))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|err| map_db_error("user list", &err))
        })
        .map_err(StoreError::from)
    }

    fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.with_tx(|tx| {
            tx.query_row(
                "SELECT username, admin, email FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(User {
                        username: row.get(0)?,
                        admin: row.get::<_, i64>(1)? != 0,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|err| map_db_error("user lookup", &err))
        })
        .map_err(StoreError::from)
    }

    fn users_for_project(&self, suffix: i32) -> Result<Vec<String>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare(
                    "SELECT username FROM assignments WHERE suffix = ?1 ORDER BY username",
                )
                .map_err(|err| map_db_error("assignment list", &err))?;
            let rows = statement
                .query_map(params![suffix], |row| row.get(0))
                .map_err(|err| map_db_error("assignment list", &err))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|err| map_db_error("assignment list", &err))
        })
        .map_err(StoreError::from)
    }

    fn add_assignment(&self, username: &str, suffix: i32) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let user_exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM users WHERE username = ?1",
                    params![username],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| map_db_error("assignment user check", &err))?;
            if user_exists.is_none() {
                return Err(SqliteStoreError::NotFound(format!("user {username}")));
            }
            let project_exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM projects WHERE suffix = ?1",
                    params![suffix],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| map_db_error("assignment project check", &err))?;
            if project_exists.is_none() {
                return Err(SqliteStoreError::NotFound(format!("project suffix {suffix}")));
            }
            tx.execute(
                "INSERT INTO assignments (username, suffix) VALUES (?1, ?2)",
                params![username, suffix],
            )
            .map_err(|err| map_db_error("assignment insert", &err))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn remove_assignment(&self, username: &str, suffix: i32) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let deleted = tx
                .execute(
                    "DELETE FROM assignments WHERE username = ?1 AND suffix = ?2",
                    params![username, suffix],
                )
                .map_err(|err| map_db_error("assignment delete", &err))?;
            if deleted == 0 {
                return Err(SqliteStoreError::NotFound(format!(
                    "assignment ({username}, {suffix})"
                )));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn projects_for_user(&self, username: &str) -> Result<Vec<i32>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare("SELECT suffix FROM assignments WHERE username = ?1 ORDER BY suffix")
                .map_err(|err| map_db_error("assignment list", &err))?;
            let rows = statement
                .query_map(params![username], |row| row.get(0))
                .map_err(|err| map_db_error("assignment list", &err))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|err| map_db_error("assignment list", &err))
        })
        .map_err(StoreError::from)
    }

    fn add_token(&self, token: &str, created_at: i64) -> Result<(), StoreError> {
        if token.trim().is_empty() {
            return Err(StoreError::Invalid("token is empty".to_string()));
        }
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO tokens (token, created_at) VALUES (?1, ?2)",
                params![token, created_at],
            )
            .map_err(|err| map_db_error("token insert", &err))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn delete_token(&self, token: &str) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let deleted = tx
                .execute("DELETE FROM tokens WHERE token = ?1", params![token])
                .map_err(|err| map_db_error("token delete", &err))?;
            if deleted == 0 {
                return Err(SqliteStoreError::NotFound("token".to_string()));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn token_exists(&self, token: &str) -> Result<bool, StoreError> {
        self.with_tx(|tx| {
            tx.query_row("SELECT 1 FROM tokens WHERE token = ?1", params![token], |row| {
                row.get::<_, i64>(0)
            })
            .optional()
            .map(|row| row.is_some())
            .map_err(|err| map_db_error("token lookup", &err))
        })
        .map_err(StoreError::from)
    }

    fn list_tokens(&self) -> Result<Vec<String>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare("SELECT token FROM tokens ORDER BY created_at, token")
                .map_err(|err| map_db_error("token list", &err))?;
            let rows = statement
                .query_map([], |row| row.get(0))
                .map_err(|err| map_db_error("token list", &err))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|err| map_db_error("token list", &err))
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the database path against length limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let rendered = path.to_string_lossy();
    if rendered.is_empty() {
        return Err(SqliteStoreError::Invalid("store path is empty".to_string()));
    }
    if rendered.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path too long".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid("store path component too long".to_string()));
        }
    }
    Ok(())
}

/// Creates the parent directory of the database file when missing.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        }
    }
    Ok(())
}

/// Opens the `SQLite` connection and applies pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "journal_mode", config.journal_mode.pragma_value())
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "synchronous", config.sync_mode.pragma_value())
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "foreign_keys", "on")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Creates tables and stamps the schema version.
fn initialize_schema(connection: &Connection) -> Result<(), SqliteStoreError> {
    let version: i64 = connection
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    if version > SCHEMA_VERSION {
        return Err(SqliteStoreError::VersionMismatch(format!(
            "store schema version {version} is newer than supported {SCHEMA_VERSION}"
        )));
    }
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS projects (
                suffix INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                admin INTEGER NOT NULL DEFAULT 0,
                email TEXT
            );
            CREATE TABLE IF NOT EXISTS assignments (
                username TEXT NOT NULL REFERENCES users(username),
                suffix INTEGER NOT NULL REFERENCES projects(suffix),
                UNIQUE(username, suffix)
            );
            CREATE TABLE IF NOT EXISTS tokens (
                token TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL
            );",
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
