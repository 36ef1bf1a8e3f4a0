// crates/doi-gateway-core/src/media.rs
// ============================================================================
// Module: Media List Codec
// Description: MIME-type-to-URL media lists and their line wire format.
// Purpose: Serialize media maps as the newline-separated `type=url` format.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! DataCite MDS represents the media attached to a DOI as newline-separated
//! `type=url` pairs in a `text/plain` body. [`MediaList`] is the in-memory
//! map form; entries are kept sorted by MIME type so the wire form is
//! deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Media list codec errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaError {
    /// A wire line has no `=` separator.
    #[error("media line has no type=url separator: {0}")]
    MalformedLine(String),
    /// A wire line has an empty MIME type or URL.
    #[error("media line has an empty type or url: {0}")]
    EmptyField(String),
}

// ============================================================================
// SECTION: Media List
// ============================================================================

/// Media list for one DOI: MIME type to landing URL.
///
/// # Invariants
/// - Keys and values are non-empty.
/// - Iteration order is sorted by MIME type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaList(BTreeMap<String, String>);

impl MediaList {
    /// Creates an empty media list.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Parses the newline-separated `type=url` wire form.
    ///
    /// Blank lines are ignored; a line without `=` or with an empty side is
    /// a validation error.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] for malformed lines.
    pub fn parse(text: &str) -> Result<Self, MediaError> {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (mime, url) =
                line.split_once('=').ok_or_else(|| MediaError::MalformedLine(line.to_string()))?;
            let mime = mime.trim();
            let url = url.trim();
            if mime.is_empty() || url.is_empty() {
                return Err(MediaError::EmptyField(line.to_string()));
            }
            entries.insert(mime.to_string(), url.to_string());
        }
        Ok(Self(entries))
    }

    /// Inserts or replaces an entry.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::EmptyField`] when either side is empty.
    pub fn insert(
        &mut self,
        mime: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<(), MediaError> {
        let mime = mime.into();
        let url = url.into();
        if mime.trim().is_empty() || url.trim().is_empty() {
            return Err(MediaError::EmptyField(format!("{mime}={url}")));
        }
        self.0.insert(mime, url);
        Ok(())
    }

    /// Returns the URL registered for a MIME type.
    #[must_use]
    pub fn get(&self, mime: &str) -> Option<&str> {
        self.0.get(mime).map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in MIME-type order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(mime, url)| (mime.as_str(), url.as_str()))
    }

    /// Serializes to the newline-separated `type=url` wire form.
    #[must_use]
    pub fn to_wire(&self) -> String {
        let mut wire = String::new();
        for (mime, url) in &self.0 {
            wire.push_str(mime);
            wire.push('=');
            wire.push_str(url);
            wire.push('\n');
        }
        wire
    }
}
