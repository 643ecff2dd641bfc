//! Intrinio client configuration.

use std::env;
use std::fmt;
use std::time::Duration;

use trinio_core::{DataError, Result};

/// Base URL for the Intrinio v2 API.
pub const INTRINIO_BASE_URL: &str = "https://api-v2.intrinio.com";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "INTRINIO_API_KEY";

/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "INTRINIO_BASE_URL";

/// Maximum number of price rows requested in one call.
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// Settings for [`IntrinioProvider`](crate::IntrinioProvider).
///
/// Passed explicitly to the provider; there is no process-wide client state.
#[derive(Clone, PartialEq, Eq)]
pub struct IntrinioConfig {
    api_key: String,
    base_url: String,
    page_size: u32,
    timeout: Duration,
}

impl fmt::Debug for IntrinioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrinioConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl IntrinioConfig {
    /// Create a configuration with the given API key and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: INTRINIO_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a configuration from `INTRINIO_API_KEY` (and optionally
    /// `INTRINIO_BASE_URL`).
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key variable is not set or empty.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DataError::ProviderNotConfigured(format!("{API_KEY_VAR} environment variable not set"))
            })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var(BASE_URL_VAR) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Override the base URL (no trailing slash needed).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the price page size (row cap).
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Override the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the price page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the HTTP timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
