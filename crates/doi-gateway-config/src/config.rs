// crates/doi-gateway-config/src/config.rs
// ============================================================================
// Module: Gateway Configuration
// Description: Configuration loading and validation for the DOI gateway.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: doi-gateway-{auth,core,mds,store-sqlite}, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits. Missing or invalid configuration fails closed: an unknown
//! context name, empty MDS credentials in the production context, an
//! undecodable signing seed, or an out-of-range timeout all abort startup
//! instead of degrading silently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use doi_gateway_auth::ExpiryUnit;
use doi_gateway_auth::SIGNING_SEED_BYTES;
use doi_gateway_auth::TokenEngine;
use doi_gateway_core::Clock;
use doi_gateway_core::Context;
use doi_gateway_core::all_chars_valid;
use doi_gateway_mds::ClientMdsConfig;
use doi_gateway_mds::CrossCiteConfig;
use doi_gateway_mds::DataCiteSearchConfig;
use doi_gateway_mds::MdsCredentials;
use doi_gateway_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "doi-gateway.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "DOI_GATEWAY_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of the institutional DOI prefix.
const MAX_PREFIX_LENGTH: usize = 32;
/// Minimum allowed upstream timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum allowed upstream timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 120_000;
/// Maximum allowed store busy timeout in milliseconds.
const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Maximum rows per search page.
pub(crate) const MAX_PAGE_SIZE: u32 = 1_000;
/// Maximum default token lifetime in expiry units.
pub(crate) const MAX_EXPIRY_AMOUNT: u32 = 10_000;
/// Default MDS request timeout in milliseconds.
const DEFAULT_MDS_TIMEOUT_MS: u64 = 30_000;
/// Default CrossCite and search timeout in milliseconds.
const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;
/// Default rows per search page.
const DEFAULT_PAGE_SIZE: u32 = 100;
/// Default token lifetime amount.
const DEFAULT_EXPIRY_AMOUNT: u32 = 24;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// DOI gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Runtime context and institutional prefix.
    pub context: ContextSection,
    /// DataCite MDS account and timeout.
    #[serde(default)]
    pub mds: MdsSection,
    /// CrossCite citation service settings.
    #[serde(default)]
    pub crosscite: CrossCiteSection,
    /// DataCite Search settings.
    #[serde(default)]
    pub search: SearchSection,
    /// Bookkeeping store settings.
    pub store: SqliteStoreConfig,
    /// Token engine settings.
    pub token: TokenSection,
    /// Outbound notification settings.
    #[serde(default)]
    pub notifier: NotifierSection,
}

/// `[context]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextSection {
    /// Active context name (DEV, POST_DEV, PRE_PROD, PROD).
    pub active: String,
    /// Institutional DOI prefix.
    pub institutional_prefix: String,
    /// Optional MDS base URL override for the active context.
    #[serde(default)]
    pub mds_base_url: Option<String>,
}

/// `[mds]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MdsSection {
    /// MDS account login.
    #[serde(default)]
    pub login: String,
    /// MDS account password.
    #[serde(default)]
    pub password: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_mds_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for MdsSection {
    fn default() -> Self {
        Self {
            login: String::new(),
            password: String::new(),
            timeout_ms: DEFAULT_MDS_TIMEOUT_MS,
        }
    }
}

/// `[crosscite]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CrossCiteSection {
    /// Optional CrossCite base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CrossCiteSection {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    /// Optional search base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub timeout_ms: u64,
    /// Rows fetched per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `[token]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSection {
    /// Base64-encoded 32-byte Ed25519 signing seed.
    pub signing_seed: String,
    /// Default lifetime unit for issued tokens.
    #[serde(default = "default_expiry_unit")]
    pub default_expiry_unit: ExpiryUnit,
    /// Default lifetime amount for issued tokens.
    #[serde(default = "default_expiry_amount")]
    pub default_expiry_amount: u32,
}

/// `[notifier]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierSection {
    /// Recipient for administrative notifications.
    #[serde(default)]
    pub contact: String,
    /// Whether notifications are delivered at all.
    #[serde(default)]
    pub enabled: bool,
}

impl Default for NotifierSection {
    fn default() -> Self {
        Self {
            contact: String::new(),
            enabled: false,
        }
    }
}

/// Returns the default MDS request timeout.
const fn default_mds_timeout_ms() -> u64 {
    DEFAULT_MDS_TIMEOUT_MS
}

/// Returns the default read-client timeout.
const fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

/// Returns the default search page size.
const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Returns the default token lifetime unit.
const fn default_expiry_unit() -> ExpiryUnit {
    ExpiryUnit::Hour
}

/// Returns the default token lifetime amount.
const fn default_expiry_amount() -> u32 {
    DEFAULT_EXPIRY_AMOUNT
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl GatewayConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let context = self.active_context()?;
        validate_prefix(&self.context.institutional_prefix)?;
        if let Some(base_url) = &self.context.mds_base_url {
            validate_url("context.mds_base_url", base_url)?;
        }

        if context == Context::Prod
            && (self.mds.login.trim().is_empty() || self.mds.password.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "mds credentials are required in the PROD context".to_string(),
            ));
        }
        validate_timeout("mds.timeout_ms", self.mds.timeout_ms)?;
        validate_timeout("crosscite.timeout_ms", self.crosscite.timeout_ms)?;
        validate_timeout("search.timeout_ms", self.search.timeout_ms)?;
        if let Some(base_url) = &self.crosscite.base_url {
            validate_url("crosscite.base_url", base_url)?;
        }
        if let Some(base_url) = &self.search.base_url {
            validate_url("search.base_url", base_url)?;
        }
        if self.search.page_size == 0 || self.search.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "search.page_size must be in 1..={MAX_PAGE_SIZE}"
            )));
        }

        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path is required".to_string()));
        }
        if self.store.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}"
            )));
        }

        let seed = STANDARD.decode(self.token.signing_seed.trim()).map_err(|err| {
            ConfigError::Invalid(format!("token.signing_seed is not base64: {err}"))
        })?;
        if seed.len() != SIGNING_SEED_BYTES {
            return Err(ConfigError::Invalid(format!(
                "token.signing_seed must decode to {SIGNING_SEED_BYTES} bytes, got {}",
                seed.len()
            )));
        }
        if self.token.default_expiry_amount == 0
            || self.token.default_expiry_amount > MAX_EXPIRY_AMOUNT
        {
            return Err(ConfigError::Invalid(format!(
                "token.default_expiry_amount must be in 1..={MAX_EXPIRY_AMOUNT}"
            )));
        }

        if self.notifier.enabled && !self.notifier.contact.contains('@') {
            return Err(ConfigError::Invalid(
                "notifier.contact must be an email address when enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the active runtime context.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown context name.
    pub fn active_context(&self) -> Result<Context, ConfigError> {
        Context::parse(&self.context.active).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown context name: {}", self.context.active))
        })
    }

    /// Builds the MDS client configuration for the active context.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid.
    pub fn mds_client_config(&self) -> Result<ClientMdsConfig, ConfigError> {
        let context = self.active_context()?;
        let base_url = self
            .context
            .mds_base_url
            .as_deref()
            .map(|base_url| validate_url("context.mds_base_url", base_url))
            .transpose()?;
        let credentials = if self.mds.login.trim().is_empty() {
            None
        } else {
            Some(MdsCredentials {
                login: self.mds.login.clone(),
                password: self.mds.password.clone(),
            })
        };
        Ok(ClientMdsConfig {
            context,
            base_url,
            institutional_prefix: self.context.institutional_prefix.clone(),
            credentials,
            timeout_ms: self.mds.timeout_ms,
        })
    }

    /// Builds the CrossCite client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the base URL is invalid.
    pub fn crosscite_config(&self) -> Result<CrossCiteConfig, ConfigError> {
        let base_url = self
            .crosscite
            .base_url
            .as_deref()
            .map(|base_url| validate_url("crosscite.base_url", base_url))
            .transpose()?;
        Ok(CrossCiteConfig {
            base_url,
            timeout_ms: self.crosscite.timeout_ms,
        })
    }

    /// Builds the DataCite Search client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the base URL is invalid.
    pub fn search_config(&self) -> Result<DataCiteSearchConfig, ConfigError> {
        let base_url = self
            .search
            .base_url
            .as_deref()
            .map(|base_url| validate_url("search.base_url", base_url))
            .transpose()?;
        Ok(DataCiteSearchConfig {
            base_url,
            timeout_ms: self.search.timeout_ms,
            page_size: self.search.page_size,
        })
    }

    /// Builds the token engine from the configured signing seed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the seed does not decode.
    pub fn token_engine(&self, clock: Arc<dyn Clock>) -> Result<TokenEngine, ConfigError> {
        TokenEngine::from_base64_seed(&self.token.signing_seed, clock)
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates the institutional DOI prefix.
fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.trim().is_empty() {
        return Err(ConfigError::Invalid("context.institutional_prefix is required".to_string()));
    }
    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::Invalid("context.institutional_prefix is too long".to_string()));
    }
    if !prefix.starts_with("10.")
        || prefix.contains('/')
        || prefix.contains(char::is_whitespace)
        || !all_chars_valid(prefix)
    {
        return Err(ConfigError::Invalid(format!(
            "context.institutional_prefix is not a DOI prefix: {prefix}"
        )));
    }
    Ok(())
}

/// Validates and parses a base URL field.
fn validate_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|err| ConfigError::Invalid(format!("{field} is not a url: {err}")))
}

/// Validates an upstream timeout field.
fn validate_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be in {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS}"
        )));
    }
    Ok(())
}
