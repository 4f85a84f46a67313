//! Straight-line fallback used when the driving route lookup fails.

use geo::{HaversineDistance, Point};

use crate::types::GeoPoint;

/// Sphere radius used by the mapping provider's geometry helpers
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Mean radius behind `geo`'s haversine
const GEO_MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// Travel-time heuristic for straight-line estimates
pub const MINUTES_PER_KM: f64 = 2.0;

/// Great-circle distance in meters on the provider's sphere.
///
/// `geo` measures on the mean radius; the central angle is the same, so the
/// result is rescaled to [`EARTH_RADIUS_METERS`].
pub fn computed_distance_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let mean = Point::from(from).haversine_distance(&Point::from(to));
    mean / GEO_MEAN_EARTH_RADIUS * EARTH_RADIUS_METERS
}

/// `"H hr M min"` from 60 minutes up, `"M min"` below.
pub fn format_minutes(total: u32) -> String {
    let hours = total / 60;
    let minutes = total % 60;
    if hours > 0 {
        format!("{} hr {} min", hours, minutes)
    } else {
        format!("{} min", minutes)
    }
}

/// Distance and travel time derived from the great-circle distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLineEstimate {
    /// Kilometers, rounded to 2 decimals
    pub km: f64,
    pub minutes: u32,
}

impl StraightLineEstimate {
    pub fn between(from: GeoPoint, to: GeoPoint) -> Self {
        Self::from_meters(computed_distance_meters(from, to))
    }

    pub fn from_meters(meters: f64) -> Self {
        Self::from_km(meters / 1000.0)
    }

    /// Minutes come from the already-rounded kilometer value.
    pub fn from_km(km: f64) -> Self {
        let km = (km * 100.0).round() / 100.0;
        let minutes = (km * MINUTES_PER_KM).round().max(0.0) as u32;
        Self { km, minutes }
    }

    pub fn distance_text(&self) -> String {
        format!("{:.2} km", self.km)
    }

    pub fn duration_text(&self) -> String {
        format_minutes(self.minutes)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(-29.8587, 31.0218);
        assert_eq!(computed_distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = computed_distance_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        // 2 * pi * R / 360
        assert!((d - 111_319.49).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn test_rescales_from_geo_mean_radius() {
        let a: Point<f64> = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 1.0);
        // 2 * pi * 6371008.8 / 360
        assert!((a.haversine_distance(&b) - 111_195.08).abs() < 0.5);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let durban = GeoPoint::new(-29.8587, 31.0218);
        let pmb = GeoPoint::new(-29.6006, 30.3794);
        let there = computed_distance_meters(durban, pmb);
        let back = computed_distance_meters(pmb, durban);
        assert!((there - back).abs() < 1e-6);
        assert!(there > 60_000.0 && there < 75_000.0, "got {}", there);
    }

    #[test]
    fn test_estimate_over_an_hour() {
        let est = StraightLineEstimate::from_km(130.4);
        assert_eq!(est.minutes, 261);
        assert_eq!(est.duration_text(), "4 hr 21 min");
        assert_eq!(est.distance_text(), "130.40 km");
    }

    #[test]
    fn test_estimate_under_an_hour() {
        let est = StraightLineEstimate::from_meters(12_346.0);
        assert_eq!(est.km, 12.35);
        assert_eq!(est.minutes, 25);
        assert_eq!(est.duration_text(), "25 min");
    }

    #[test]
    fn test_exact_hour() {
        assert_eq!(format_minutes(60), "1 hr 0 min");
        assert_eq!(format_minutes(59), "59 min");
        assert_eq!(format_minutes(0), "0 min");
    }

    #[test]
    fn test_estimate_between_points() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let est = StraightLineEstimate::between(a, b);
        assert_eq!(est.km, 111.32);
        assert_eq!(est.minutes, 223);
        assert_eq!(est.duration_text(), "3 hr 43 min");
    }
}
