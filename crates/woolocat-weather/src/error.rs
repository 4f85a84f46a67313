use thiserror::Error;
use woolocat_core::NetworkError;

/// Weather provider and relay errors
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Api { .. } => "Weather service error. Please try again.",
            Self::InvalidApiKey => "Weather API key is invalid. Check settings.",
            Self::Parse(_) => "Unexpected response from the weather service.",
        }
    }
}
