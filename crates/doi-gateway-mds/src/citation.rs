// crates/doi-gateway-mds/src/citation.rs
// ============================================================================
// Module: CrossCite Citation Client
// Description: Read-only client for the CrossCite citation formatter.
// Purpose: List styles/locales and format citations for registered DOIs.
// Dependencies: doi-gateway-core, reqwest, url
// ============================================================================

//! ## Overview
//! Thin read-only adapter over the CrossCite citation service: `styles` and
//! `locales` return JSON string arrays, `format` returns a plain-text
//! citation. Used by landing-page verification flows; failures map into the
//! shared outcome taxonomy so callers branch the same way as for MDS calls.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use doi_gateway_core::ApiOutcome;
use doi_gateway_core::MdsError;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default CrossCite endpoint.
const DEFAULT_CROSSCITE_BASE_URL: &str = "https://citation.crosscite.org";
/// Maximum upstream response size read into memory.
const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;
/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the CrossCite client.
#[derive(Debug, Clone)]
pub struct CrossCiteConfig {
    /// Optional CrossCite base URL override.
    pub base_url: Option<Url>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for CrossCiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Read-only CrossCite citation client.
pub struct CrossCiteClient {
    /// Resolved CrossCite base URL.
    base_url: Url,
    /// HTTP client used for upstream requests.
    client: Client,
}

impl CrossCiteClient {
    /// Creates a CrossCite client.
    ///
    /// # Errors
    ///
    /// Returns [`MdsError`] when the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: CrossCiteConfig) -> Result<Self, MdsError> {
        let base_url = match config.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_CROSSCITE_BASE_URL)
                .map_err(|err| MdsError::transport(format!("invalid crosscite url: {err}")))?,
        };
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(Policy::none())
            .build()
            .map_err(|err| MdsError::transport(format!("http client build failed: {err}")))?;
        Ok(Self {
            base_url,
            client,
        })
    }

    /// Lists the available citation styles.
    ///
    /// # Errors
    ///
    /// Returns [`MdsError`] for upstream or transport failures.
    pub fn styles(&self) -> Result<Vec<String>, MdsError> {
        self.fetch_string_array("styles")
    }

    /// Lists the available citation locales.
    ///
    /// # Errors
    ///
    /// Returns [`MdsError`] for upstream or transport failures.
    pub fn locales(&self) -> Result<Vec<String>, MdsError> {
        self.fetch_string_array("locales")
    }

    /// Formats a citation for a DOI in the given style and language.
    ///
    /// # Errors
    ///
    /// Fails fast with a validation error when any parameter is empty;
    /// upstream failures are classified per the taxonomy.
    pub fn format(&self, doi: &str, style: &str, lang: &str) -> Result<String, MdsError> {
        if doi.trim().is_empty() || style.trim().is_empty() || lang.trim().is_empty() {
            return Err(MdsError::validation("doi, style, and lang are all required"));
        }
        let mut url = self.resource_url("format")?;
        url.query_pairs_mut()
            .append_pair("doi", doi)
            .append_pair("style", style)
            .append_pair("lang", lang);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| MdsError::transport(format!("crosscite request failed: {err}")))?;
        let status = response.status().as_u16();
        let mut body = String::new();
        response
            .take(MAX_RESPONSE_BYTES)
            .read_to_string(&mut body)
            .map_err(|err| MdsError::transport(format!("failed to read response: {err}")))?;
        if ApiOutcome::from_status(status).is_success() {
            Ok(body)
        } else {
            Err(MdsError::upstream(status, body))
        }
    }

    /// Fetches a JSON array of strings from a resource.
    fn fetch_string_array(&self, resource: &str) -> Result<Vec<String>, MdsError> {
        let url = self.resource_url(resource)?;
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| MdsError::transport(format!("crosscite request failed: {err}")))?;
        let status = response.status().as_u16();
        if !ApiOutcome::from_status(status).is_success() {
            let mut body = String::new();
            let _ = response.take(MAX_RESPONSE_BYTES).read_to_string(&mut body);
            return Err(MdsError::upstream(status, body));
        }
        response
            .json::<Vec<String>>()
            .map_err(|err| MdsError::transport(format!("invalid crosscite json: {err}")))
    }

    /// Builds the URL for a CrossCite resource.
    fn resource_url(&self, resource: &str) -> Result<Url, MdsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| MdsError::transport("crosscite base url cannot be a base"))?
            .pop_if_empty()
            .push(resource);
        Ok(url)
    }
}
