// crates/doi-gateway-core/src/lib.rs
// ============================================================================
// Module: DOI Gateway Core Library
// Description: Public API surface for the DOI gateway core.
// Purpose: Expose DOI/context policy, outcome taxonomy, and interfaces.
// Dependencies: crate::{context, doi, interfaces, media, metadata, outcome}
// ============================================================================

//! ## Overview
//! DOI gateway core provides the pure policy layer shared by every other
//! crate in the workspace: runtime contexts, DOI name validation and
//! test-prefix substitution, the closed upstream outcome taxonomy, the
//! metadata and media wire representations, and the collaborator interfaces
//! (data access, notifier, clock) that the service crates are built against.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod doi;
pub mod interfaces;
pub mod media;
pub mod metadata;
pub mod outcome;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::Context;
pub use doi::DoiError;
pub use doi::DoiName;
pub use doi::TEST_DOI_PREFIX;
pub use doi::all_chars_valid;
pub use interfaces::Clock;
pub use interfaces::DoiDataAccess;
pub use interfaces::LogNotifier;
pub use interfaces::ManualClock;
pub use interfaces::NoopNotifier;
pub use interfaces::Notifier;
pub use interfaces::NotifyError;
pub use interfaces::Project;
pub use interfaces::StoreError;
pub use interfaces::SystemClock;
pub use interfaces::User;
pub use media::MediaError;
pub use media::MediaList;
pub use metadata::MetadataDocument;
pub use metadata::MetadataError;
pub use outcome::ApiOutcome;
pub use outcome::MdsError;
