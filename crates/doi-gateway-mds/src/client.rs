// crates/doi-gateway-mds/src/client.rs
// ============================================================================
// Module: DataCite MDS Client
// Description: Protocol adapter for the DataCite Metadata Store API.
// Purpose: Translate DOI/metadata/media operations into MDS HTTP calls.
// Dependencies: doi-gateway-core, reqwest, url
// ============================================================================

//! ## Overview
//! [`ClientMds`] carries the runtime context fixed at construction and maps
//! each domain operation to the matching `doi/`, `metadata/`, or `media/`
//! resource. DOI names are validated and test-prefix substituted before any
//! network call; URL paths are built by appending each DOI component as its
//! own path segment. Write operations carry `?testMode=true` whenever the
//! context's test-mode flag is set. Each call uses an independent
//! request/response pair, so no state leaks between concurrent invocations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use doi_gateway_core::ApiOutcome;
use doi_gateway_core::Context;
use doi_gateway_core::DoiName;
use doi_gateway_core::MdsError;
use doi_gateway_core::MediaList;
use doi_gateway_core::MetadataDocument;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum upstream response size read into memory.
const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;
/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Content type for DOI registration and media bodies.
const TEXT_PLAIN_UTF8: &str = "text/plain;charset=UTF-8";
/// Content type for metadata bodies.
const APPLICATION_XML: &str = "application/xml";
/// Query parameter marking non-persistent registrations upstream.
const TEST_MODE_PARAM: &str = "testMode";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Basic-auth credentials for the MDS account.
#[derive(Debug, Clone)]
pub struct MdsCredentials {
    /// Account login.
    pub login: String,
    /// Account password.
    pub password: String,
}

/// Configuration for the MDS client.
///
/// # Invariants
/// - `base_url`, when set, overrides the context's default endpoint.
/// - `institutional_prefix` is the prefix every accepted DOI must carry.
#[derive(Debug, Clone)]
pub struct ClientMdsConfig {
    /// Runtime context fixed for the lifetime of the client.
    pub context: Context,
    /// Optional MDS base URL override.
    pub base_url: Option<Url>,
    /// Institutional DOI prefix.
    pub institutional_prefix: String,
    /// Optional basic-auth credentials.
    pub credentials: Option<MdsCredentials>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ClientMdsConfig {
    /// Builds a configuration for the given context and prefix with the
    /// context's default endpoint and timeout.
    #[must_use]
    pub fn for_context(context: Context, institutional_prefix: impl Into<String>) -> Self {
        Self {
            context,
            base_url: None,
            institutional_prefix: institutional_prefix.into(),
            credentials: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// DataCite MDS protocol adapter.
///
/// # Invariants
/// - Every DOI reaching the wire has been validated and substituted per the
///   context.
/// - Outcomes are classified into the closed `ApiOutcome` taxonomy.
pub struct ClientMds {
    /// Client configuration.
    config: ClientMdsConfig,
    /// Resolved MDS base URL.
    base_url: Url,
    /// HTTP client used for upstream requests.
    client: Client,
}

impl ClientMds {
    /// Creates an MDS client for the configured context.
    ///
    /// # Errors
    ///
    /// Returns [`MdsError`] when the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: ClientMdsConfig) -> Result<Self, MdsError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(config.context.mds_base_url())
                .map_err(|err| MdsError::transport(format!("invalid mds base url: {err}")))?,
        };
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(Policy::none())
            .build()
            .map_err(|err| MdsError::transport(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Returns the context the client was constructed with.
    #[must_use]
    pub const fn context(&self) -> Context {
        self.config.context
    }

    // ------------------------------------------------------------------
    // DOI resource
    // ------------------------------------------------------------------

    /// Fetches the landing-page URL registered for a DOI.
    ///
    /// Returns `Ok(Some(url))` when the DOI resolves, `Ok(None)` when the
    /// DOI is known upstream but carries no content (registered without a
    /// resolvable landing page).
    ///
    /// # Errors
    ///
    /// Returns [`MdsError`] with `DOI_NOT_FOUND` for 404, the classified
    /// upstream outcome for other non-success statuses, and
    /// `INTERNAL_ERROR` for transport failures.
    pub fn get_doi(&self, doi: &str) -> Result<Option<String>, MdsError> {
        let doi = self.accept_doi(doi)?;
        let url = self.resource_url("doi", Some(&doi), false)?;
        let response = self.send(self.client.get(url))?;
        let (status, body) = read_limited(response)?;
        match ApiOutcome::from_status(status) {
            ApiOutcome::Success => Ok(Some(body)),
            ApiOutcome::SuccessNoContent => Ok(None),
            _ => Err(MdsError::upstream(status, body)),
        }
    }

    /// Registers a DOI against a landing-page URL.
    ///
    /// The body is the two-line `doi=<doi>`/`url=<url>` form, `text/plain`
    /// UTF-8. Returns the upstream short status text.
    ///
    /// # Errors
    ///
    /// Fails fast with a validation error when either parameter is missing
    /// or the DOI is malformed; `PRECONDITION_FAILED` surfaces when
    /// metadata has not been uploaded yet.
    pub fn create_doi(&self, doi: &str, landing_url: &str) -> Result<String, MdsError> {
        if landing_url.trim().is_empty() {
            return Err(MdsError::validation("landing page url is missing"));
        }
        let landing = Url::parse(landing_url)
            .map_err(|err| MdsError::validation(format!("invalid landing page url: {err}")))?;
        let doi = self.accept_doi(doi)?;
        let url = self.resource_url("doi", Some(&doi), true)?;
        let body = format!("doi={doi}\nurl={landing}");
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, TEXT_PLAIN_UTF8)
            .body(body);
        let response = self.send(request)?;
        expect_success(response)
    }

    // ------------------------------------------------------------------
    // Metadata resource
    // ------------------------------------------------------------------

    /// Fetches the current metadata XML for a DOI.
    ///
    /// # Errors
    ///
    /// `DOI_NOT_FOUND` for 404 and `DOI_INACTIVE` for 410 are
    /// distinguishable outcomes.
    pub fn get_metadata(&self, doi: &str) -> Result<String, MdsError> {
        let doi = self.accept_doi(doi)?;
        let url = self.resource_url("metadata", Some(&doi), false)?;
        let response = self.send(self.client.get(url).header(ACCEPT, APPLICATION_XML))?;
        expect_success(response)
    }

    /// Fetches and structurally parses the current metadata for a DOI.
    ///
    /// # Errors
    ///
    /// Upstream outcomes as [`Self::get_metadata`]; a document that fails
    /// structural validation surfaces as an internal error, since the
    /// upstream answered with an unusable body.
    pub fn get_metadata_as_document(&self, doi: &str) -> Result<MetadataDocument, MdsError> {
        let xml = self.get_metadata(doi)?;
        MetadataDocument::parse(xml)
            .map_err(|err| MdsError::transport(format!("upstream metadata unusable: {err}")))
    }

    /// Uploads metadata for the DOI embedded in the document.
    ///
    /// The identifier inside the XML is validated and test-prefix
    /// substituted before upload; the request path is built from the
    /// substituted identifier. Returns the upstream short status text.
    ///
    /// # Errors
    ///
    /// Structural validation failures are validation errors (no upstream
    /// round trip); upstream rejections carry their classified outcome.
    pub fn create_metadata(&self, xml: &str) -> Result<String, MdsError> {
        let document = MetadataDocument::parse(xml)
            .map_err(|err| MdsError::validation(err.to_string()))?;
        let doi = self.accept_doi(document.identifier())?;
        let document = document.with_identifier(&doi);
        let url = self.resource_url("metadata", Some(&doi), true)?;
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, APPLICATION_XML)
            .body(document.into_xml());
        let response = self.send(request)?;
        expect_success(response)
    }

    /// Marks the metadata of a DOI inactive upstream.
    ///
    /// # Errors
    ///
    /// `DOI_NOT_FOUND` when the DOI has no metadata upstream.
    pub fn delete_metadata(&self, doi: &str) -> Result<String, MdsError> {
        let doi = self.accept_doi(doi)?;
        let url = self.resource_url("metadata", Some(&doi), true)?;
        let response = self.send(self.client.delete(url))?;
        expect_success(response)
    }

    /// Deletes metadata and returns the last stored document.
    ///
    /// # Errors
    ///
    /// As [`Self::delete_metadata`]; the returned body must parse as a
    /// structurally valid document.
    pub fn delete_metadata_as_document(&self, doi: &str) -> Result<MetadataDocument, MdsError> {
        let document = self.get_metadata_as_document(doi)?;
        self.delete_metadata(doi)?;
        Ok(document)
    }

    // ------------------------------------------------------------------
    // Media resource
    // ------------------------------------------------------------------

    /// Fetches the media list registered for a DOI.
    ///
    /// # Errors
    ///
    /// Upstream outcomes per the taxonomy; a malformed upstream media body
    /// is an internal error.
    pub fn get_media(&self, doi: &str) -> Result<MediaList, MdsError> {
        let doi = self.accept_doi(doi)?;
        let url = self.resource_url("media", Some(&doi), false)?;
        let response = self.send(self.client.get(url))?;
        let body = expect_success(response)?;
        MediaList::parse(&body)
            .map_err(|err| MdsError::transport(format!("upstream media unusable: {err}")))
    }

    /// Registers a media list for a DOI.
    ///
    /// # Errors
    ///
    /// An empty list fails fast with a validation error.
    pub fn create_media(&self, doi: &str, media: &MediaList) -> Result<String, MdsError> {
        if media.is_empty() {
            return Err(MdsError::validation("media list is empty"));
        }
        let doi = self.accept_doi(doi)?;
        let url = self.resource_url("media", Some(&doi), true)?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, TEXT_PLAIN_UTF8)
            .body(media.to_wire());
        let response = self.send(request)?;
        expect_success(response)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Validates a raw DOI and applies the context's prefix substitution.
    fn accept_doi(&self, raw: &str) -> Result<DoiName, MdsError> {
        let doi = DoiName::parse(raw, &self.config.institutional_prefix)
            .map_err(|err| MdsError::validation(err.to_string()))?;
        Ok(doi.substitute_prefix(self.config.context))
    }

    /// Builds the request URL for a resource, appending each DOI component
    /// as its own path segment and the test-mode marker on writes.
    fn resource_url(
        &self,
        resource: &str,
        doi: Option<&DoiName>,
        is_write: bool,
    ) -> Result<Url, MdsError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| MdsError::transport("mds base url cannot be a base"))?;
            segments.pop_if_empty();
            segments.push(resource);
            if let Some(doi) = doi {
                for component in doi.segments() {
                    segments.push(component);
                }
            }
        }
        if is_write && self.config.context.is_test_mode() {
            url.query_pairs_mut().append_pair(TEST_MODE_PARAM, "true");
        }
        Ok(url)
    }

    /// Attaches credentials and sends the request.
    fn send(&self, request: RequestBuilder) -> Result<Response, MdsError> {
        let request = match &self.config.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.login, Some(&credentials.password))
            }
            None => request,
        };
        request.send().map_err(|err| MdsError::transport(format!("mds request failed: {err}")))
    }
}

// ============================================================================
// SECTION: Response Handling
// ============================================================================

/// Reads the status and size-limited body of a response.
fn read_limited(response: Response) -> Result<(u16, String), MdsError> {
    let status = response.status().as_u16();
    let mut body = String::new();
    response
        .take(MAX_RESPONSE_BYTES)
        .read_to_string(&mut body)
        .map_err(|err| MdsError::transport(format!("failed to read mds response: {err}")))?;
    Ok((status, body))
}

/// Returns the body of a success response, or the classified upstream error.
fn expect_success(response: Response) -> Result<String, MdsError> {
    let (status, body) = read_limited(response)?;
    if ApiOutcome::from_status(status).is_success() {
        Ok(body)
    } else {
        Err(MdsError::upstream(status, body))
    }
}
