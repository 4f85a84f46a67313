use geo::{coord, Coord, Intersects, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Resolved latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `lat,lng` as the web services expect it
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lng, p.lat)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        GeoPoint::new(p.y(), p.x())
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        coord! { x: p.lng, y: p.lat }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Driving route between two points, as the provider formats it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_text: String,
    pub distance_meters: u64,
    pub duration_text: String,
    pub duration_seconds: u64,
}

/// Result of resolving one address
#[derive(Debug)]
pub enum GeocodeOutcome {
    Resolved(GeoPoint),
    Failed(GeoError),
}

impl GeocodeOutcome {
    pub fn point(&self) -> Option<GeoPoint> {
        match self {
            Self::Resolved(p) => Some(*p),
            Self::Failed(_) => None,
        }
    }
}

impl From<Result<GeoPoint, GeoError>> for GeocodeOutcome {
    fn from(result: Result<GeoPoint, GeoError>) -> Self {
        match result {
            Ok(p) => Self::Resolved(p),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Result of a driving distance/duration lookup
#[derive(Debug)]
pub enum RouteOutcome {
    Found(RouteLeg),
    Failed(GeoError),
}

impl From<Result<RouteLeg, GeoError>> for RouteOutcome {
    fn from(result: Result<RouteLeg, GeoError>) -> Self {
        match result {
            Ok(leg) => Self::Found(leg),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Axis-aligned lat/lng box grown to include every point it has seen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds(Rect<f64>);

impl Bounds {
    pub fn from_point(p: GeoPoint) -> Self {
        let c = Coord::from(p);
        Self(Rect::new(c, c))
    }

    pub fn extend(&mut self, p: GeoPoint) {
        let c = Coord::from(p);
        let (min, max) = (self.0.min(), self.0.max());
        self.0 = Rect::new(
            coord! { x: min.x.min(c.x), y: min.y.min(c.y) },
            coord! { x: max.x.max(c.x), y: max.y.max(c.y) },
        );
    }

    /// Edges count as inside.
    pub fn contains(&self, p: GeoPoint) -> bool {
        self.0.intersects(&Coord::from(p))
    }

    pub fn center(&self) -> GeoPoint {
        let c = self.0.center();
        GeoPoint::new(c.y, c.x)
    }

    pub fn south(&self) -> f64 {
        self.0.min().y
    }

    pub fn west(&self) -> f64 {
        self.0.min().x
    }

    pub fn north(&self) -> f64 {
        self.0.max().y
    }

    pub fn east(&self) -> f64 {
        self.0.max().x
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_bounds_extend() {
        let mut b = Bounds::from_point(GeoPoint::new(-29.85, 31.02));
        b.extend(GeoPoint::new(-29.60, 30.38));
        assert!(b.contains(GeoPoint::new(-29.85, 31.02)));
        assert!(b.contains(GeoPoint::new(-29.60, 30.38)));
        assert!(b.contains(GeoPoint::new(-29.70, 30.70)));
        assert!(!b.contains(GeoPoint::new(-26.2, 28.0)));
    }

    #[test]
    fn test_bounds_edges_and_center() {
        let mut b = Bounds::from_point(GeoPoint::new(-30.0, 30.0));
        b.extend(GeoPoint::new(-29.0, 31.0));
        assert_eq!(b.south(), -30.0);
        assert_eq!(b.north(), -29.0);
        assert_eq!(b.west(), 30.0);
        assert_eq!(b.east(), 31.0);
        assert_eq!(b.center(), GeoPoint::new(-29.5, 30.5));
        assert!(b.contains(GeoPoint::new(-29.0, 30.2)));
    }

    #[test]
    fn test_point_axis_order() {
        let p = Point::from(GeoPoint::new(-29.85, 31.02));
        assert_eq!(p.x(), 31.02);
        assert_eq!(p.y(), -29.85);
        assert_eq!(GeoPoint::from(p), GeoPoint::new(-29.85, 31.02));
    }

    #[test]
    fn test_point_query_format() {
        assert_eq!(GeoPoint::new(-29.5, 31.25).to_query(), "-29.5,31.25");
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: GeocodeOutcome = Ok(GeoPoint::new(1.0, 2.0)).into();
        assert_eq!(ok.point(), Some(GeoPoint::new(1.0, 2.0)));
        let err: GeocodeOutcome = Err(GeoError::NoResults).into();
        assert!(err.point().is_none());
    }
}
