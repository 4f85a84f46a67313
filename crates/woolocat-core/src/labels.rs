//! Text shown in the dashboard cells.

pub const CALCULATING: &str = "Calculating...";
pub const CHECKING_WEATHER: &str = "Checking weather...";

// Blanket errors applied to every distance/duration cell
pub const NO_STORE_ADDRESS: &str = "No store address";
pub const STORE_LOCATION_ERROR: &str = "Location error";
pub const API_ERROR: &str = "API Error";
pub const MAPS_AUTH_ERROR: &str = "Maps API Error";

// Per-row errors
pub const GEOCODING_FAILED: &str = "Geocoding failed";
pub const NO_ADDRESS: &str = "No address";

pub const DRIVING_DISTANCE_TITLE: &str = "Actual driving distance";
pub const DRIVING_TIME_TITLE: &str = "Estimated driving time";
pub const STRAIGHT_LINE_DISTANCE_TITLE: &str = "Straight-line distance";
pub const STRAIGHT_LINE_TIME_TITLE: &str = "Estimated based on straight-line distance";
pub const ESTIMATE_SUFFIX: &str = " (est.)";

pub const NO_LOCATION_DATA: &str = "No location data";
pub const WEATHER_UNAVAILABLE: &str = "Weather data unavailable";
pub const WEATHER_FETCH_ERROR: &str = "Error fetching weather";
