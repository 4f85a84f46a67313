pub mod config;
pub mod dashboard;
pub mod error;
pub mod labels;

pub use config::{
    AdminConfig, Config, MapsConfig, RelayConfig, StoreConfig, ValidationResult, WeatherConfig,
};
pub use dashboard::{Cell, Dashboard, Row};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging for the dashboard binaries
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Woolocat core initialized");
    Ok(())
}
