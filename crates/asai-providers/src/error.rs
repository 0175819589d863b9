//! Provider errors.

use thiserror::Error;

/// Failures talking to a remote model.
///
/// Text model failures propagate to the caller; the image path turns them
/// into inline turns instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not found: set the {env_key} environment variable")]
    MissingApiKey { env_key: &'static str },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {provider} failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}: {body}")]
    Api {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned no text: {reason}")]
    EmptyResponse {
        provider: &'static str,
        reason: String,
    },
}
