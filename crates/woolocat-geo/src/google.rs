//! Google Maps web service client (Geocoding + Distance Matrix).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;
use woolocat_core::{NetworkError, ReqwestErrorExt};

use crate::error::GeoError;
use crate::provider::MapsProvider;
use crate::types::{GeoPoint, GeocodeOutcome, RouteLeg, RouteOutcome};

const MAPS_API_BASE: &str = "https://maps.googleapis.com/maps/api";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
    value: u64,
}

pub struct GoogleMapsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, MAPS_API_BASE)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Geocode an address, taking the first result.
    #[instrument(skip(self), level = "debug")]
    pub async fn geocode_address(&self, address: &str) -> Result<GeoPoint, GeoError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeoError::EmptyAddress);
        }

        let url = format!("{}/geocode/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let body: GeocodeResponse = self.handle_response(response).await?;
        tracing::debug!("Geocode status {} for '{}'", body.status, address);

        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Err(GeoError::NoResults),
            _ => {
                return Err(GeoError::Status {
                    status: body.status,
                    message: body.error_message,
                })
            }
        }

        let first = body.results.into_iter().next().ok_or(GeoError::NoResults)?;
        Ok(GeoPoint::new(
            first.geometry.location.lat,
            first.geometry.location.lng,
        ))
    }

    /// Driving distance/duration for a single origin/destination pair, metric units.
    #[instrument(skip(self), level = "debug")]
    pub async fn distance_matrix(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteLeg, GeoError> {
        let url = format!("{}/distancematrix/json", self.base_url);
        let origins = origin.to_query();
        let destinations = destination.to_query();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("mode", "driving"),
                ("units", "metric"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let body: DistanceMatrixResponse = self.handle_response(response).await?;

        if body.status != "OK" {
            return Err(GeoError::Status {
                status: body.status,
                message: body.error_message,
            });
        }

        let element = body
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(|| GeoError::Parse("Distance matrix response has no elements".into()))?;

        if element.status != "OK" {
            return Err(GeoError::NoRoute(element.status));
        }

        match (element.distance, element.duration) {
            (Some(distance), Some(duration)) => Ok(RouteLeg {
                distance_text: distance.text,
                distance_meters: distance.value,
                duration_text: duration.text,
                duration_seconds: duration.value,
            }),
            _ => Err(GeoError::Parse(
                "Distance matrix element missing distance or duration".into(),
            )),
        }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GeoError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeoError::Network(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MapsProvider for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> GeocodeOutcome {
        self.geocode_address(address).await.into()
    }

    async fn driving_route(&self, origin: GeoPoint, destination: GeoPoint) -> RouteOutcome {
        self.distance_matrix(origin, destination).await.into()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[tokio::test]
    async fn test_empty_address_makes_no_request() {
        // Unroutable base URL: a request would fail with a network error instead
        let client = GoogleMapsClient::with_base_url("key", "http://127.0.0.1:9");
        let err = client.geocode_address("   ").await.unwrap_err();
        assert!(matches!(err, GeoError::EmptyAddress));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GoogleMapsClient::with_base_url("key", "http://localhost:1234/maps/api/");
        assert_eq!(client.base_url, "http://localhost:1234/maps/api");
    }
}
