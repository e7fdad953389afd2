//! Error types for routing and model calls

use crate::registry::Provider;

/// Errors that can occur while classifying or executing a task
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Model id not present in the registry
    #[error("Model {model} not found")]
    UnknownModel {
        model: String,
        /// Ids the caller could have used instead
        available: Vec<String>,
    },

    #[error("Unknown routing category: {0}")]
    UnknownCategory(String),

    /// Commercial provider selected without its key in the environment
    #[error("No API key for {provider}. Set {env_var} to use commercial models.")]
    MissingApiKey {
        provider: Provider,
        env_var: &'static str,
    },

    #[error("{provider} server not reachable at {url}")]
    Unreachable { provider: Provider, url: String },

    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with a non-success status
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: Provider,
        status: u16,
        body: String,
    },

    /// Provider answered 2xx but without usable text
    #[error("Unexpected response from {provider}: {message}")]
    InvalidResponse { provider: Provider, message: String },

    /// Classifier reply could not be turned into a classification
    #[error("Could not parse classification: {0}")]
    Classification(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;
