// crates/doi-gateway-store-sqlite/src/lib.rs
// ============================================================================
// Module: DOI Gateway SQLite Store Library
// Description: SQLite-backed implementation of the gateway data access.
// Purpose: Persist project, user, assignment, and token bookkeeping.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! This crate provides [`SqliteDataAccess`], a durable implementation of the
//! core `DoiDataAccess` interface backed by a single `SQLite` database with
//! WAL journaling. All mutations run inside explicit transactions so
//! multi-row writes are all-or-nothing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteDataAccess;
pub use store::SqliteJournalMode;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
