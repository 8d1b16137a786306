//! Configuration for the ingestion layer.
//!
//! # Environment Variables
//!
//! - `ANALYTICS_API_URL`: base URL of the analytics API
//!   (default: `https://api.nansen.ai`)
//! - `ANALYTICS_API_KEY`: value of the `apiKey` header (default: none)
//! - `BOARD_FANOUT_PAGES`: pages fetched concurrently for locally processed
//!   boards (default: 5)

use crate::error::IngestionError;
use crate::fanout::DEFAULT_FANOUT_PAGES;
use std::env;
use url::Url;

/// Default analytics API base URL.
pub const DEFAULT_API_URL: &str = "https://api.nansen.ai";

/// Connection settings for the analytics API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL that endpoint paths are joined onto.
    pub base_url: Url,

    /// API key sent in the `apiKey` header, if any.
    pub api_key: Option<String>,

    /// Pages fetched concurrently when a board is processed locally.
    pub fanout_pages: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            fanout_pages: DEFAULT_FANOUT_PAGES,
        }
    }
}

impl ApiConfig {
    /// Config pointing at `base_url` with no key.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Set the API key (builder pattern).
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the fan-out page count (builder pattern).
    pub fn with_fanout_pages(mut self, pages: usize) -> Self {
        self.fanout_pages = pages;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// Unset or empty variables fall back to defaults. A set but malformed
    /// URL or page count is an error rather than a silent fallback.
    ///
    /// # Example
    ///
    /// ```rust
    /// use board_ingestion::ApiConfig;
    ///
    /// // With ANALYTICS_API_URL unset, the default base URL is used.
    /// let config = ApiConfig::from_env();
    /// ```
    pub fn from_env() -> Result<Self, IngestionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IngestionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = match var("ANALYTICS_API_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                IngestionError::Config(format!("ANALYTICS_API_URL `{}`: {}", raw, e))
            })?,
            None => default_base_url(),
        };

        let fanout_pages = match var("BOARD_FANOUT_PAGES") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(pages) if pages > 0 => pages,
                _ => {
                    return Err(IngestionError::Config(format!(
                        "BOARD_FANOUT_PAGES must be a positive integer, got `{}`",
                        raw
                    )))
                }
            },
            None => DEFAULT_FANOUT_PAGES,
        };

        Ok(Self {
            base_url,
            api_key: var("ANALYTICS_API_KEY"),
            fanout_pages,
        })
    }

    /// Returns true if an API key is configured.
    #[inline]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("default API URL is valid")
}
