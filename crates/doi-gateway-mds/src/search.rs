// crates/doi-gateway-mds/src/search.rs
// ============================================================================
// Module: DataCite Search Client
// Description: Read-only client for the DataCite Search API.
// Purpose: List the DOIs registered under a publisher, page by page.
// Dependencies: doi-gateway-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! Thin read-only adapter over the DataCite Search API. The only query the
//! gateway needs is "every DOI registered under this publisher", used as a
//! guard before project deletion: a project with registered DOIs must not
//! be removed. Results are paginated; the client walks pages until the
//! reported total is collected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use doi_gateway_core::ApiOutcome;
use doi_gateway_core::MdsError;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default DataCite Search endpoint.
const DEFAULT_SEARCH_BASE_URL: &str = "https://search.datacite.org/api";
/// Default page size for search requests.
const DEFAULT_PAGE_SIZE: u32 = 100;
/// Hard cap on pages walked for a single query.
const MAX_PAGES: u32 = 1_000;
/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the DataCite Search client.
#[derive(Debug, Clone)]
pub struct DataCiteSearchConfig {
    /// Optional search base URL override.
    pub base_url: Option<Url>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Rows fetched per page.
    pub page_size: u32,
}

impl Default for DataCiteSearchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Top-level search response envelope.
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    /// Query response payload.
    response: SearchResponse,
}

/// Search response payload.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Total number of matching documents.
    #[serde(rename = "numFound")]
    num_found: u64,
    /// Documents on this page.
    docs: Vec<SearchDoc>,
}

/// One search document; only the DOI field is requested.
#[derive(Debug, Deserialize)]
struct SearchDoc {
    /// DOI name of the document.
    doi: String,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Read-only DataCite Search client.
#[derive(Debug)]
pub struct DataCiteSearchClient {
    /// Resolved search base URL.
    base_url: Url,
    /// Rows fetched per page.
    page_size: u32,
    /// HTTP client used for upstream requests.
    client: Client,
}

impl DataCiteSearchClient {
    /// Creates a search client.
    ///
    /// # Errors
    ///
    /// Returns [`MdsError`] when the base URL is invalid, the page size is
    /// zero, or the HTTP client cannot be constructed.
    pub fn new(config: DataCiteSearchConfig) -> Result<Self, MdsError> {
        if config.page_size == 0 {
            return Err(MdsError::validation("search page size must be positive"));
        }
        let base_url = match config.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_SEARCH_BASE_URL)
                .map_err(|err| MdsError::transport(format!("invalid search url: {err}")))?,
        };
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(Policy::none())
            .build()
            .map_err(|err| MdsError::transport(format!("http client build failed: {err}")))?;
        Ok(Self {
            base_url,
            page_size: config.page_size,
            client,
        })
    }

    /// Collects every DOI registered under a publisher.
    ///
    /// Walks `rows`/`start` pages until `response.numFound` documents have
    /// been gathered; an empty page before the total is reached (or a page
    /// count past the hard cap) is treated as an upstream inconsistency.
    ///
    /// # Errors
    ///
    /// Fails fast with a validation error for an empty publisher name;
    /// upstream and transport failures are classified per the taxonomy.
    pub fn dois_for_publisher(&self, publisher: &str) -> Result<Vec<String>, MdsError> {
        if publisher.trim().is_empty() {
            return Err(MdsError::validation("publisher name is required"));
        }
        let mut dois: Vec<String> = Vec::new();
        let mut start: u64 = 0;
        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(publisher, start)?;
            let total = page.num_found;
            let collected = u64::try_from(dois.len()).unwrap_or(u64::MAX);
            if page.docs.is_empty() {
                if collected >= total {
                    return Ok(dois);
                }
                return Err(MdsError::transport(format!(
                    "search returned {collected} of {total} documents and then an empty page"
                )));
            }
            start += u64::try_from(page.docs.len()).unwrap_or(u64::MAX);
            dois.extend(page.docs.into_iter().map(|doc| doc.doi));
            if u64::try_from(dois.len()).unwrap_or(u64::MAX) >= total {
                return Ok(dois);
            }
        }
        Err(MdsError::transport("search pagination exceeded the page cap"))
    }

    /// Returns true when at least one DOI is registered under a publisher.
    ///
    /// # Errors
    ///
    /// As [`Self::dois_for_publisher`].
    pub fn has_registered_dois(&self, publisher: &str) -> Result<bool, MdsError> {
        if publisher.trim().is_empty() {
            return Err(MdsError::validation("publisher name is required"));
        }
        let page = self.fetch_page(publisher, 0)?;
        Ok(page.num_found > 0)
    }

    /// Fetches one page of publisher search results.
    fn fetch_page(&self, publisher: &str, start: u64) -> Result<SearchResponse, MdsError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("publisher:{publisher}"))
            .append_pair("fl", "doi")
            .append_pair("wt", "json")
            .append_pair("rows", &self.page_size.to_string())
            .append_pair("start", &start.to_string());
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| MdsError::transport(format!("search request failed: {err}")))?;
        let status = response.status().as_u16();
        if !ApiOutcome::from_status(status).is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MdsError::upstream(status, body));
        }
        let envelope: SearchEnvelope = response
            .json()
            .map_err(|err| MdsError::transport(format!("invalid search json: {err}")))?;
        Ok(envelope.response)
    }
}
