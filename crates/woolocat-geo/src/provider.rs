use async_trait::async_trait;

use crate::types::{GeoPoint, GeocodeOutcome, RouteOutcome};

/// Mapping provider consumed by the pipeline and the weather relay.
///
/// Implementations report failures through the outcome enums; neither call
/// retries.
#[async_trait]
pub trait MapsProvider: Send + Sync {
    /// Resolve a free-form address to a coordinate.
    async fn geocode(&self, address: &str) -> GeocodeOutcome;

    /// Driving distance and duration from `origin` to `destination`.
    async fn driving_route(&self, origin: GeoPoint, destination: GeoPoint) -> RouteOutcome;
}
