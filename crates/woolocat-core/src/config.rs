use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub maps: MapsConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Mapping provider (geocoding + distance matrix)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
}

fn default_maps_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_maps_base_url(),
        }
    }
}

/// Weather provider used by the relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Unit system passed to the provider (metric, imperial, standard)
    #[serde(default = "default_weather_units")]
    pub units: String,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_units() -> String {
    "metric".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            units: default_weather_units(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Origin for every distance lookup
    #[serde(default)]
    pub address: String,
}

/// Weather relay endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Remote relay to call; the relay runs in-process when unset
    #[serde(default)]
    pub url: Option<String>,

    /// Listen address for `woolocat relay`
    #[serde(default = "default_relay_bind")]
    pub bind: String,

    /// Anti-forgery token expected by the relay
    #[serde(default)]
    pub nonce: String,
}

fn default_relay_bind() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: None,
            bind: default_relay_bind(),
            nonce: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Prefix for order edit links
    #[serde(default = "default_admin_base_url")]
    pub base_url: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_admin_base_url() -> String {
    "/wp-admin".to_string()
}

fn default_currency_symbol() -> String {
    "R".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: default_admin_base_url(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// Trim and drop control characters, the way the settings form stored them.
fn sanitize_setting(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config.with_env_overrides());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config.sanitized().with_env_overrides())
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    fn sanitized(mut self) -> Self {
        self.maps.api_key = sanitize_setting(&self.maps.api_key);
        self.weather.api_key = sanitize_setting(&self.weather.api_key);
        self.store.address = sanitize_setting(&self.store.address);
        self.relay.nonce = sanitize_setting(&self.relay.nonce);
        self
    }

    /// Environment variables win over the file
    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("WOOLOCAT_MAPS_API_KEY") {
            self.maps.api_key = sanitize_setting(&v);
        }
        if let Ok(v) = std::env::var("WOOLOCAT_WEATHER_API_KEY") {
            self.weather.api_key = sanitize_setting(&v);
        }
        if let Ok(v) = std::env::var("WOOLOCAT_STORE_ADDRESS") {
            self.store.address = sanitize_setting(&v);
        }
        if let Ok(v) = std::env::var("WOOLOCAT_RELAY_NONCE") {
            self.relay.nonce = sanitize_setting(&v);
        }
        self
    }

    /// Mapping key, or the missing-setting error that blanks the distance columns
    pub fn require_maps_key(&self) -> Result<&str, ConfigError> {
        if self.maps.api_key.is_empty() {
            return Err(ConfigError::MissingSetting("maps.api_key".to_string()));
        }
        Ok(&self.maps.api_key)
    }

    /// Relay token, required before the relay is served over HTTP
    pub fn require_relay_nonce(&self) -> Result<&str, ConfigError> {
        if self.relay.nonce.is_empty() {
            return Err(ConfigError::MissingSetting("relay.nonce".to_string()));
        }
        Ok(&self.relay.nonce)
    }

    /// Validate the configuration
    ///
    /// Missing keys and store address are warnings: the dashboard still
    /// renders and shows error labels in the affected cells.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.maps.base_url, "maps.base_url", &mut result);
        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        if let Some(url) = &self.relay.url {
            self.validate_url(url, "relay.url", &mut result);
        }

        if self.maps.api_key.is_empty() {
            result.add_warning("maps.api_key", "Mapping API key not set - distances unavailable");
        }
        if self.weather.api_key.is_empty() {
            result.add_warning("weather.api_key", "Weather API key not set - weather shows N/A");
        }
        if self.store.address.is_empty() {
            result.add_warning("store.address", "Store address not set");
        }

        if !matches!(self.weather.units.as_str(), "metric" | "imperial" | "standard") {
            result.add_error(
                "weather.units",
                format!("Unknown unit system: {}", self.weather.units),
            );
        }

        if self.relay.bind.parse::<std::net::SocketAddr>().is_err() {
            result.add_error(
                "relay.bind",
                format!("Not a socket address: {}", self.relay.bind),
            );
        }

        if self.relay.nonce.is_empty() {
            result.add_warning(
                "relay.nonce",
                "Relay token not set - `woolocat relay` will not start",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to a file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("woolocat");

        Ok(config_dir.join("config.toml"))
    }
}
