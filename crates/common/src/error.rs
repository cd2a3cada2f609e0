//! Unified error type for drought-watch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("Primary provider failed: {0}")]
    PrimaryProviderFatal(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Prediction invocation failed: {0}")]
    PredictionInvocation(String),

    #[error("Historical data error: {0}")]
    History(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for an adapter-local failure.
    pub fn provider(provider: &str, reason: impl Into<String>) -> Self {
        Error::ProviderUnavailable {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidCoordinates(_))
    }
}
