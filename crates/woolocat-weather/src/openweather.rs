//! OpenWeather current-conditions client.

use serde::Deserialize;
use tracing::instrument;
use woolocat_core::ReqwestErrorExt;
use woolocat_geo::GeoPoint;

use crate::error::WeatherError;

const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    #[serde(default)]
    weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    main: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: &str, units: &str) -> Self {
        Self::with_base_url(api_key, units, OPENWEATHER_API_BASE)
    }

    pub fn with_base_url(api_key: &str, units: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            units: units.to_string(),
        }
    }

    /// Main condition group (`Clear`, `Rain`, ...) at a coordinate.
    ///
    /// `Ok(None)` when the provider answered without a condition.
    #[instrument(skip(self), level = "debug")]
    pub async fn current_condition(&self, point: GeoPoint) -> Result<Option<String>, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        let lat = point.lat.to_string();
        let lon = point.lng.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(WeatherError::InvalidApiKey);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CurrentWeatherResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(body
            .weather
            .into_iter()
            .next()
            .and_then(|c| c.main)
            .filter(|m| !m.trim().is_empty()))
    }
}
