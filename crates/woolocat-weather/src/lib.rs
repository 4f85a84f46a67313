//! Weather labels for the dashboard rows.
//!
//! The host-side [`WeatherRelay`] geocodes a location and asks OpenWeather
//! for the current condition. The [`WeatherAnnotator`] fills each row's
//! weather cell through a [`RelayTransport`], either over HTTP or in-process.

pub mod annotator;
pub mod error;
pub mod openweather;
pub mod relay;
pub mod server;
pub mod transport;

pub use annotator::{AnnotationReport, WeatherAnnotator};
pub use error::WeatherError;
pub use openweather::OpenWeatherClient;
pub use relay::{RelayData, RelayRequest, RelayResponse, WeatherRelay, WEATHER_ACTION};
pub use transport::{HttpRelayClient, RelayTransport};
