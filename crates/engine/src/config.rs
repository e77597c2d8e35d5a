//! Search configuration via `recdex.toml`
//!
//! Every tunable of the subsystem lives here and is passed explicitly to
//! the components that need it; there is no global configuration state.
//! Missing keys fall back to the reference defaults in
//! [`recdex_core::limits`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use recdex_core::limits::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_MIN_PREFIX_LEN, DEFAULT_PAGE_SIZE, MAX_BATCH_WRITES,
    MAX_PAGE_SIZE,
};
use recdex_core::{Locale, RecdexError, RecdexResult};

use crate::retry::RetryConfig;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "recdex.toml";

/// Search configuration loaded from `recdex.toml`.
///
/// # Example
///
/// ```toml
/// min_prefix_len = 3
/// locales = ["en", "de"]
/// default_page_size = 25
///
/// [retry]
/// max_retries = 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum token/prefix length eligible for indexing
    #[serde(default = "default_min_prefix_len")]
    pub min_prefix_len: usize,
    /// Locales a keyword field is maintained for
    #[serde(default = "default_locales")]
    pub locales: Vec<Locale>,
    /// Page size when a request does not set one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Largest page size a request may ask for
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Records per reindex chunk (clamped to the store's batch limit)
    #[serde(default = "default_reindex_chunk_size")]
    pub reindex_chunk_size: usize,
    /// Lifetime of cached first pages in seconds (0 disables caching)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Retry policy for reindex chunk commits
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_min_prefix_len() -> usize {
    DEFAULT_MIN_PREFIX_LEN
}

fn default_locales() -> Vec<Locale> {
    Locale::ALL.to_vec()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_reindex_chunk_size() -> usize {
    MAX_BATCH_WRITES
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_prefix_len: default_min_prefix_len(),
            locales: default_locales(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            reindex_chunk_size: default_reindex_chunk_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Check value ranges and cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first offending key.
    pub fn validate(&self) -> RecdexResult<()> {
        if self.min_prefix_len == 0 {
            return Err(RecdexError::config("min_prefix_len must be at least 1"));
        }
        if self.locales.is_empty() {
            return Err(RecdexError::config("locales must name at least one locale"));
        }
        if self.max_page_size == 0 {
            return Err(RecdexError::config("max_page_size must be at least 1"));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(RecdexError::config(format!(
                "default_page_size must be in 1..={}, got {}",
                self.max_page_size, self.default_page_size
            )));
        }
        if self.reindex_chunk_size == 0 {
            return Err(RecdexError::config("reindex_chunk_size must be at least 1"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# recdex search configuration
#
# Minimum token length that is indexed, and minimum term length that is
# matched against the keyword index (shorter terms list everything).
min_prefix_len = 3

# Locales that get a keywords_<locale> field on every record.
locales = ["en", "de"]

# Page sizes for search requests.
default_page_size = 25
max_page_size = 500

# Records per reindex chunk; clamped to the store's atomic batch limit.
reindex_chunk_size = 500

# Seconds a cached first page stays valid (0 disables the cache).
cache_ttl_secs = 300

# Retry policy for reindex chunk commits (max_retries = 0 disables retry).
[retry]
max_retries = 0
base_delay_ms = 100
max_delay_ms = 5000
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> RecdexResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecdexError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: SearchConfig = toml::from_str(&content).map_err(|e| {
            RecdexError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> RecdexResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }
}
