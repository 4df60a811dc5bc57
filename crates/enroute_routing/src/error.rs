use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Provider returned no route")]
    NoRoute,

    #[error("Incomplete response: {0}")]
    IncompleteResponse(String),
}

/// How a failed provider attempt is classified. Both kinds are recovered by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TransportFailure,
    MalformedResponse,
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Request(err) if err.is_decode() => FailureKind::MalformedResponse,
            ProviderError::Request(_) | ProviderError::Api { .. } | ProviderError::Timeout(_) => {
                FailureKind::TransportFailure
            }
            ProviderError::Deserialize(_)
            | ProviderError::NoRoute
            | ProviderError::IncompleteResponse(_) => FailureKind::MalformedResponse,
        }
    }
}
