//! Provider error types.

use thiserror::Error;

/// Errors from a delegated LLM provider call.
///
/// The pipeline retries only transient failures (see
/// [`ProviderError::is_transient`]); fatal ones stop the stage's attempt
/// loop immediately.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The provider returned a 429 Too Many Requests response.
    #[error("rate limited - retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The provider response envelope could not be parsed.
    #[error("provider response parse error: {0}")]
    Envelope(String),

    /// The requested model is not in the model registry.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// The API key environment variable for the model is not set.
    #[error("missing API key: environment variable {env} is not set")]
    MissingApiKey {
        /// Name of the environment variable.
        env: String,
    },
}

impl ProviderError {
    /// Whether the pipeline may retry after this error.
    ///
    /// Transport glitches, rate limits, server errors, and malformed
    /// provider envelopes are transient. Client errors (bad request, auth)
    /// and configuration problems (unknown model, missing key) are fatal.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } | Self::Envelope(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::UnknownModel(_) | Self::MissingApiKey { .. } => false,
        }
    }
}
