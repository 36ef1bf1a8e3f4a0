// crates/doi-gateway-core/src/metadata.rs
// ============================================================================
// Module: Metadata Document
// Description: Opaque DataCite metadata XML with an addressable identifier.
// Purpose: Extract, validate, and rewrite the embedded DOI identifier.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The gateway treats DataCite metadata as an opaque XML document; the only
//! structure it relies on is the `<resource>` root and the
//! `<identifier identifierType="DOI">` element. Parsing locates the
//! identifier once, so the test-prefix substitution can rewrite it in place
//! before upload without a full schema object model. Structural validation
//! failures are a distinct outcome from upstream rejection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::Range;

use thiserror::Error;

use crate::doi::DoiName;
use crate::doi::all_chars_valid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted metadata document size in bytes.
const MAX_METADATA_BYTES: usize = 1024 * 1024;

/// Opening tag of the identifier element.
const IDENTIFIER_OPEN: &str = "<identifier";
/// Closing tag of the identifier element.
const IDENTIFIER_CLOSE: &str = "</identifier>";
/// Required identifier type attribute.
const DOI_TYPE_ATTRIBUTE: &str = "identifierType=\"DOI\"";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural metadata validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// The document is empty.
    #[error("metadata document is empty")]
    Empty,
    /// The document exceeds the accepted size.
    #[error("metadata document exceeds {MAX_METADATA_BYTES} bytes")]
    TooLarge,
    /// The document has no `<resource>` root element.
    #[error("metadata document has no resource root element")]
    MissingResourceRoot,
    /// The document has no identifier element.
    #[error("metadata document has no identifier element")]
    MissingIdentifier,
    /// The identifier element is not DOI-typed.
    #[error("metadata identifier is not of type DOI")]
    NotDoiTyped,
    /// The identifier element is malformed or unterminated.
    #[error("metadata identifier element is malformed")]
    MalformedIdentifier,
    /// The identifier value is empty.
    #[error("metadata identifier value is empty")]
    EmptyIdentifier,
    /// The identifier value contains characters outside the DOI set.
    #[error("metadata identifier contains invalid characters: {0}")]
    InvalidIdentifier(String),
}

// ============================================================================
// SECTION: Metadata Document
// ============================================================================

/// Parsed metadata document with a located DOI identifier.
///
/// # Invariants
/// - `identifier_range` addresses the identifier text inside `xml`.
/// - The identifier value is non-empty and within the DOI character set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDocument {
    /// Full XML document text.
    xml: String,
    /// Byte range of the identifier text inside `xml`.
    identifier_range: Range<usize>,
}

impl MetadataDocument {
    /// Parses a metadata document and validates its structure.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the document is empty or oversized,
    /// lacks a resource root or DOI-typed identifier, or the identifier
    /// value is empty or outside the DOI character set.
    pub fn parse(xml: impl Into<String>) -> Result<Self, MetadataError> {
        let xml = xml.into();
        if xml.trim().is_empty() {
            return Err(MetadataError::Empty);
        }
        if xml.len() > MAX_METADATA_BYTES {
            return Err(MetadataError::TooLarge);
        }
        if !xml.contains("<resource") {
            return Err(MetadataError::MissingResourceRoot);
        }
        let identifier_range = locate_identifier(&xml)?;
        let value = &xml[identifier_range.clone()];
        if value.trim().is_empty() {
            return Err(MetadataError::EmptyIdentifier);
        }
        if !all_chars_valid(value) {
            return Err(MetadataError::InvalidIdentifier(value.to_string()));
        }
        Ok(Self {
            xml,
            identifier_range,
        })
    }

    /// Returns the DOI identifier value embedded in the document.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.xml[self.identifier_range.clone()]
    }

    /// Returns a copy of the document with the identifier replaced.
    ///
    /// Used for test-prefix substitution: the DOI lives inside the XML, so
    /// renaming it for non-production contexts means rewriting the element
    /// text, not just the request path.
    #[must_use]
    pub fn with_identifier(&self, doi: &DoiName) -> Self {
        let mut xml = String::with_capacity(self.xml.len());
        xml.push_str(&self.xml[..self.identifier_range.start]);
        xml.push_str(doi.as_str());
        xml.push_str(&self.xml[self.identifier_range.end..]);
        let start = self.identifier_range.start;
        Self {
            identifier_range: start..start + doi.as_str().len(),
            xml,
        }
    }

    /// Returns the document as XML text.
    #[must_use]
    pub fn as_xml(&self) -> &str {
        &self.xml
    }

    /// Consumes the document and returns the XML text.
    #[must_use]
    pub fn into_xml(self) -> String {
        self.xml
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Locates the DOI-typed identifier text inside the document.
fn locate_identifier(xml: &str) -> Result<Range<usize>, MetadataError> {
    let open = xml.find(IDENTIFIER_OPEN).ok_or(MetadataError::MissingIdentifier)?;
    let tag_rest = &xml[open + IDENTIFIER_OPEN.len()..];
    let tag_end =
        tag_rest.find('>').ok_or(MetadataError::MalformedIdentifier)?;
    let attributes = &tag_rest[..tag_end];
    if attributes.ends_with('/') {
        return Err(MetadataError::EmptyIdentifier);
    }
    if !attributes.contains(DOI_TYPE_ATTRIBUTE) {
        return Err(MetadataError::NotDoiTyped);
    }
    let text_start = open + IDENTIFIER_OPEN.len() + tag_end + 1;
    let text_len = xml[text_start..]
        .find(IDENTIFIER_CLOSE)
        .ok_or(MetadataError::MalformedIdentifier)?;
    Ok(text_start..text_start + text_len)
}
