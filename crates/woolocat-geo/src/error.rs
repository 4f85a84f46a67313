//! Mapping provider errors.

use thiserror::Error;
use woolocat_core::NetworkError;

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Top-level status other than OK (REQUEST_DENIED, OVER_QUERY_LIMIT, ...)
    #[error("Provider returned {status}{}", detail(.message))]
    Status {
        status: String,
        message: Option<String>,
    },

    #[error("No results for address")]
    NoResults,

    /// Per-element status of a distance matrix response (NOT_FOUND, ZERO_RESULTS)
    #[error("No route: {0}")]
    NoRoute(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty address")]
    EmptyAddress,
}

impl GeoError {
    /// True when the provider rejected our key rather than the request.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Status { status, .. } => status == "REQUEST_DENIED",
            Self::Network(NetworkError::ServerError { status, .. }) => {
                *status == 401 || *status == 403
            }
            _ => false,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Status { status, .. } if status == "OVER_QUERY_LIMIT" => {
                "Mapping quota exceeded. Please try again later."
            }
            Self::Status { .. } if self.is_auth_failure() => {
                "The mapping API key was rejected. Check settings."
            }
            Self::Status { .. } => "The mapping service returned an error.",
            Self::NoResults => "Address could not be found.",
            Self::NoRoute(_) => "No driving route between these places.",
            Self::Parse(_) => "Unexpected response from the mapping service.",
            Self::EmptyAddress => "No address given.",
        }
    }
}
