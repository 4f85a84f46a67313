//! Geocoding, delivery distance and map state for the dashboard.
//!
//! The mapping provider is consumed through [`MapsProvider`]; the Google
//! Maps web service client is the production implementation. The
//! [`EnrichmentPipeline`] fills each row's distance and duration cells and
//! hands back a [`MapSession`] for the view-mode switcher.

pub mod error;
pub mod google;
pub mod map;
pub mod pipeline;
pub mod provider;
pub mod spherical;
pub mod types;

pub use error::GeoError;
pub use google::GoogleMapsClient;
pub use map::{LayerCanvas, MapCanvas, MapSession, ViewMode};
pub use pipeline::{EnrichmentPipeline, PipelineReport, RowOutcome};
pub use provider::MapsProvider;
pub use spherical::{computed_distance_meters, format_minutes, StraightLineEstimate};
pub use types::*;
