use async_trait::async_trait;
use tracing::instrument;
use woolocat_core::{NetworkError, ReqwestErrorExt};

use crate::error::WeatherError;
use crate::relay::{RelayRequest, RelayResponse};

/// How the annotator reaches the weather relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// `Err` only for transport-level failures; relay-side failures come back
    /// as a response with `success: false`.
    async fn request_weather(&self, location: &str) -> Result<RelayResponse, WeatherError>;
}

/// Posts relay requests to a remote endpoint as a form.
pub struct HttpRelayClient {
    client: reqwest::Client,
    url: String,
    nonce: String,
}

impl HttpRelayClient {
    pub fn new(url: &str, nonce: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            nonce: nonce.to_string(),
        }
    }
}

#[async_trait]
impl RelayTransport for HttpRelayClient {
    #[instrument(skip(self), level = "debug")]
    async fn request_weather(&self, location: &str) -> Result<RelayResponse, WeatherError> {
        let form = RelayRequest::weather(location, &self.nonce);

        let response = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Network(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }));
        }

        response
            .json::<RelayResponse>()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))
    }
}
