//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when validating requests, fetching vendor data, or reshaping it.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, unexpected HTTP status).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Data is not available for the requested key or date range.
    #[error("Data not available for {symbol} in range {start} to {end}")]
    DataNotAvailable {
        /// The symbol or fundamental id that was requested.
        symbol: String,
        /// Start of the requested range.
        start: String,
        /// End of the requested range.
        end: String,
    },

    /// No reported financials exist for a fundamental id.
    #[error(
        "No reported financials for {0}: please make sure that the ticker, statement, year and period are valid"
    )]
    StatementNotFound(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A vendor line item was missing a required field.
    #[error("Malformed record in {key}: missing {field}")]
    MalformedRecord {
        /// The fundamental id the record belongs to.
        key: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Authentication failed for a provider.
    #[error("Authentication failed for provider {0}: check the API key")]
    AuthenticationFailed(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true if the error was raised before any request was sent.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}

impl From<polars::prelude::PolarsError> for DataError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        Self::Other(e.to_string())
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
