//! Host-side weather relay.
//!
//! Accepts a location string plus the anti-forgery token, geocodes the
//! location and returns the provider's main condition. Lookup failures are
//! reported as a successful response carrying `"N/A"`; only a bad token or
//! an empty location produce `success: false`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use woolocat_geo::{GeocodeOutcome, MapsProvider};

use crate::error::WeatherError;
use crate::openweather::OpenWeatherClient;
use crate::transport::RelayTransport;

pub const WEATHER_ACTION: &str = "get_weather_data";
pub const NOT_AVAILABLE: &str = "N/A";

pub const INVALID_TOKEN: &str = "Invalid security token";
pub const INVALID_LOCATION: &str = "Invalid location";

/// Form body posted to the relay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayRequest {
    pub action: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub location: String,
}

impl RelayRequest {
    pub fn weather(location: &str, nonce: &str) -> Self {
        Self {
            action: WEATHER_ACTION.to_string(),
            nonce: nonce.to_string(),
            location: location.to_string(),
        }
    }
}

/// Payload of the envelope. Anything that is neither a weather object nor a
/// message decodes as `Other`, so a malformed payload still reads as a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RelayData {
    Weather {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weather: Option<String>,
    },
    Message(String),
    Other(serde_json::Value),
}

/// `{ "success": bool, "data": ... }` envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<RelayData>,
}

impl RelayResponse {
    pub fn weather(label: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(RelayData::Weather {
                weather: Some(label.into()),
            }),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(RelayData::Message(message.into())),
        }
    }

    /// The weather label, when the relay succeeded and sent a non-empty one.
    pub fn weather_label(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        match &self.data {
            Some(RelayData::Weather {
                weather: Some(weather),
            }) if !weather.trim().is_empty() => Some(weather.as_str()),
            _ => None,
        }
    }
}

pub struct WeatherRelay {
    maps: Option<Arc<dyn MapsProvider>>,
    weather: Option<OpenWeatherClient>,
    nonce: String,
}

impl WeatherRelay {
    /// `maps` and `weather` are `None` when their API keys are not configured.
    pub fn new(
        maps: Option<Arc<dyn MapsProvider>>,
        weather: Option<OpenWeatherClient>,
        nonce: &str,
    ) -> Self {
        Self {
            maps,
            weather,
            nonce: nonce.to_string(),
        }
    }

    /// Constant-time comparison against the configured token; an empty
    /// configured token accepts everything.
    pub fn verify_token(&self, token: &str) -> bool {
        if self.nonce.is_empty() {
            return true;
        }
        let expected = self.nonce.as_bytes();
        let given = token.as_bytes();
        if expected.len() != given.len() {
            return false;
        }
        expected
            .iter()
            .zip(given)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Token check for requests arriving over HTTP. Without a configured
    /// token nothing is accepted.
    pub fn verify_remote_token(&self, token: &str) -> bool {
        !self.nonce.is_empty() && self.verify_token(token)
    }

    pub async fn handle(&self, request: &RelayRequest) -> RelayResponse {
        if !self.verify_token(&request.nonce) {
            tracing::warn!("Relay request with invalid token rejected");
            return RelayResponse::error(INVALID_TOKEN);
        }

        let location: String = request
            .location
            .chars()
            .filter(|c| !c.is_control())
            .collect();
        let location = location.trim();
        if location.is_empty() {
            return RelayResponse::error(INVALID_LOCATION);
        }

        match self.lookup(location).await {
            Some(label) => RelayResponse::weather(label),
            None => RelayResponse::weather(NOT_AVAILABLE),
        }
    }

    async fn lookup(&self, location: &str) -> Option<String> {
        let weather = self.weather.as_ref()?;
        let maps = self.maps.as_ref()?;

        let point = match maps.geocode(location).await {
            GeocodeOutcome::Resolved(p) => p,
            GeocodeOutcome::Failed(e) => {
                tracing::debug!("Relay geocode failed for '{}': {}", location, e);
                return None;
            }
        };

        match weather.current_condition(point).await {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!("Weather lookup failed for '{}': {}", location, e);
                None
            }
        }
    }
}

/// In-process transport: no HTTP hop, the relay's own token is used.
#[async_trait]
impl RelayTransport for WeatherRelay {
    async fn request_weather(&self, location: &str) -> Result<RelayResponse, WeatherError> {
        let request = RelayRequest::weather(location, &self.nonce);
        Ok(self.handle(&request).await)
    }
}
