//! Per-row geocode → distance/time enrichment.
//!
//! The store address is resolved first; if that fails every row gets the
//! same error label and no per-row work is issued. Otherwise each row is
//! resolved concurrently, and results are written to their rows in
//! completion order. The viewport is refit once after all rows settle.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use woolocat_core::{labels, Cell, Dashboard, Row};

use crate::error::GeoError;
use crate::map::{MapCanvas, MapSession};
use crate::provider::MapsProvider;
use crate::spherical::StraightLineEstimate;
use crate::types::{GeoPoint, GeocodeOutcome, RouteLeg, RouteOutcome};

pub const STORE_MARKER_TITLE: &str = "Store Location";

/// What happened to one row
#[derive(Debug)]
pub enum RowOutcome {
    /// Address could not be resolved; no distance work was attempted.
    Unresolved(GeoError),
    Driving {
        position: GeoPoint,
        leg: RouteLeg,
    },
    /// Route lookup failed; straight-line estimate used instead.
    Estimated {
        position: GeoPoint,
        estimate: StraightLineEstimate,
        route_error: GeoError,
    },
}

impl RowOutcome {
    pub fn position(&self) -> Option<GeoPoint> {
        match self {
            Self::Unresolved(_) => None,
            Self::Driving { position, .. } | Self::Estimated { position, .. } => Some(*position),
        }
    }

    /// Write the terminal distance/duration cells.
    pub fn apply(&self, row: &mut Row) {
        match self {
            Self::Unresolved(_) => row.fail_route(labels::GEOCODING_FAILED),
            Self::Driving { leg, .. } => {
                row.distance = Cell::ready(&leg.distance_text, labels::DRIVING_DISTANCE_TITLE);
                row.duration = Cell::ready(&leg.duration_text, labels::DRIVING_TIME_TITLE);
            }
            Self::Estimated { estimate, .. } => {
                row.distance = Cell::ready(
                    estimate.distance_text(),
                    labels::STRAIGHT_LINE_DISTANCE_TITLE,
                );
                row.duration = Cell::ready(
                    format!("{}{}", estimate.duration_text(), labels::ESTIMATE_SUFFIX),
                    labels::STRAIGHT_LINE_TIME_TITLE,
                );
            }
        }
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub store: Option<GeoPoint>,
    /// Blanket label applied when the run stopped before any row work
    pub aborted: Option<&'static str>,
    pub driving: usize,
    pub estimated: usize,
    pub unresolved: usize,
    pub skipped: usize,
    pub viewport_fitted: bool,
}

impl PipelineReport {
    pub fn resolved(&self) -> usize {
        self.driving + self.estimated
    }
}

pub struct EnrichmentPipeline {
    provider: Arc<dyn MapsProvider>,
}

impl EnrichmentPipeline {
    pub fn new(provider: Arc<dyn MapsProvider>) -> Self {
        Self { provider }
    }

    /// Fill the distance and duration cells of every row and populate `session`.
    pub async fn run<C: MapCanvas>(
        &self,
        dashboard: &mut Dashboard,
        session: &mut MapSession<C>,
    ) -> PipelineReport {
        let mut report = PipelineReport::default();

        let store_address = dashboard.store_address.trim().to_string();
        if store_address.is_empty() {
            tracing::error!("Store address not set");
            dashboard.fail_all_routes(labels::NO_STORE_ADDRESS);
            report.aborted = Some(labels::NO_STORE_ADDRESS);
            return report;
        }

        let store = match self.provider.geocode(&store_address).await {
            GeocodeOutcome::Resolved(point) => point,
            GeocodeOutcome::Failed(e) => {
                tracing::error!("Store geocoding failed: {}", e);
                let label = if e.is_auth_failure() {
                    labels::MAPS_AUTH_ERROR
                } else {
                    labels::STORE_LOCATION_ERROR
                };
                dashboard.fail_all_routes(label);
                report.aborted = Some(label);
                return report;
            }
        };

        tracing::info!("Store location: {}", store);
        session.set_store(store, STORE_MARKER_TITLE);
        report.store = Some(store);

        let mut lookups = FuturesUnordered::new();
        for (index, row) in dashboard.rows.iter_mut().enumerate() {
            let address = row.address.trim().to_string();
            if address.is_empty() {
                row.fail_route(labels::NO_ADDRESS);
                report.skipped += 1;
                continue;
            }

            let provider = Arc::clone(&self.provider);
            lookups.push(async move {
                let outcome = enrich_row(provider.as_ref(), store, &address).await;
                (index, address, outcome)
            });
        }

        while let Some((index, address, outcome)) = lookups.next().await {
            match &outcome {
                RowOutcome::Unresolved(e) => {
                    tracing::warn!("Geocoding failed for '{}': {}", address, e);
                    report.unresolved += 1;
                }
                RowOutcome::Driving { .. } => report.driving += 1,
                RowOutcome::Estimated { route_error, .. } => {
                    tracing::warn!(
                        "Distance lookup failed for '{}', using straight-line estimate: {}",
                        address,
                        route_error
                    );
                    report.estimated += 1;
                }
            }

            if let Some(position) = outcome.position() {
                session.add_row_marker(position, &address);
            }
            if let Some(row) = dashboard.rows.get_mut(index) {
                outcome.apply(row);
            }
        }

        report.viewport_fitted = session.refit_viewport();
        tracing::info!(
            "Enrichment finished: {} driving, {} estimated, {} unresolved, {} skipped",
            report.driving,
            report.estimated,
            report.unresolved,
            report.skipped
        );
        report
    }
}

/// Resolve one address, then look up the route with a straight-line fallback.
pub async fn enrich_row(
    provider: &dyn MapsProvider,
    store: GeoPoint,
    address: &str,
) -> RowOutcome {
    let position = match provider.geocode(address).await {
        GeocodeOutcome::Resolved(point) => point,
        GeocodeOutcome::Failed(e) => return RowOutcome::Unresolved(e),
    };

    match provider.driving_route(store, position).await {
        RouteOutcome::Found(leg) => RowOutcome::Driving { position, leg },
        RouteOutcome::Failed(route_error) => RowOutcome::Estimated {
            position,
            estimate: StraightLineEstimate::between(position, store),
            route_error,
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::map::{LayerCanvas, ViewMode};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use woolocat_core::NetworkError;

    const STORE: &str = "1 Florida Rd, Durban";

    /// Provider backed by a lookup table that counts calls.
    #[derive(Default)]
    struct FakeMaps {
        places: HashMap<String, GeoPoint>,
        denied: bool,
        routes_fail: bool,
        geocode_calls: AtomicUsize,
        route_calls: AtomicUsize,
    }

    impl FakeMaps {
        fn with_places(places: &[(&str, GeoPoint)]) -> Self {
            Self {
                places: places
                    .iter()
                    .map(|(a, p)| (a.to_string(), *p))
                    .collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl MapsProvider for FakeMaps {
        async fn geocode(&self, address: &str) -> GeocodeOutcome {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            if self.denied {
                return GeocodeOutcome::Failed(GeoError::Status {
                    status: "REQUEST_DENIED".into(),
                    message: None,
                });
            }
            match self.places.get(address) {
                Some(p) => GeocodeOutcome::Resolved(*p),
                None => GeocodeOutcome::Failed(GeoError::NoResults),
            }
        }

        async fn driving_route(&self, origin: GeoPoint, destination: GeoPoint) -> RouteOutcome {
            self.route_calls.fetch_add(1, Ordering::SeqCst);
            if self.routes_fail {
                return RouteOutcome::Failed(GeoError::Status {
                    status: "OVER_QUERY_LIMIT".into(),
                    message: None,
                });
            }
            let est = StraightLineEstimate::between(origin, destination);
            RouteOutcome::Found(RouteLeg {
                distance_text: format!("{:.1} km", est.km * 1.3),
                distance_meters: (est.km * 1300.0) as u64,
                duration_text: "42 mins".into(),
                duration_seconds: 2520,
            })
        }
    }

    fn store_point() -> GeoPoint {
        GeoPoint::new(-29.8387, 31.0173)
    }

    fn dashboard(addresses: &[&str]) -> Dashboard {
        Dashboard::new(
            STORE,
            addresses
                .iter()
                .map(|a| Row::new(*a, 1, 100.0, "R100.00", "[]"))
                .collect(),
        )
    }

    async fn run(
        maps: Arc<FakeMaps>,
        dash: &mut Dashboard,
    ) -> (PipelineReport, MapSession<LayerCanvas>) {
        let pipeline = EnrichmentPipeline::new(maps);
        let mut session = MapSession::new(LayerCanvas::new());
        let report = pipeline.run(dash, &mut session).await;
        (report, session)
    }

    #[tokio::test]
    async fn test_driving_route_success() {
        let maps = Arc::new(FakeMaps::with_places(&[
            (STORE, store_point()),
            ("5 Umgeni Rd", GeoPoint::new(-29.80, 31.02)),
        ]));
        let mut dash = dashboard(&["5 Umgeni Rd"]);
        let (report, session) = run(maps.clone(), &mut dash).await;

        let row = &dash.rows[0];
        assert_eq!(row.duration.text_or(""), "42 mins");
        assert_eq!(row.distance.title(), Some(labels::DRIVING_DISTANCE_TITLE));
        assert_eq!(report.driving, 1);
        assert!(report.viewport_fitted);
        assert_eq!(session.markers().len(), 1);
    }

    #[tokio::test]
    async fn test_route_failure_falls_back_to_straight_line() {
        let row_point = GeoPoint::new(-29.6006, 30.3794);
        let mut fake =
            FakeMaps::with_places(&[(STORE, store_point()), ("Pietermaritzburg", row_point)]);
        fake.routes_fail = true;
        let maps = Arc::new(fake);
        let mut dash = dashboard(&["Pietermaritzburg"]);
        let (report, _) = run(maps, &mut dash).await;

        let expected = StraightLineEstimate::between(row_point, store_point());
        let row = &dash.rows[0];
        assert_eq!(row.distance.text_or(""), expected.distance_text());
        assert_eq!(
            row.duration.text_or(""),
            format!("{} (est.)", expected.duration_text())
        );
        assert_eq!(row.distance.title(), Some(labels::STRAIGHT_LINE_DISTANCE_TITLE));
        assert!(!row.distance.is_error());
        assert_eq!(report.estimated, 1);
    }

    #[tokio::test]
    async fn test_unresolved_row_is_isolated() {
        let maps = Arc::new(FakeMaps::with_places(&[
            (STORE, store_point()),
            ("Good St", GeoPoint::new(-29.85, 31.00)),
        ]));
        let mut dash = dashboard(&["Nowhere Lane", "Good St"]);
        let (report, session) = run(maps.clone(), &mut dash).await;

        assert_eq!(dash.rows[0].distance.text_or(""), labels::GEOCODING_FAILED);
        assert_eq!(dash.rows[0].duration.text_or(""), labels::GEOCODING_FAILED);
        assert!(!dash.rows[1].distance.is_error());
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.driving, 1);
        // only the resolved row asked for a route
        assert_eq!(maps.route_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.markers().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_blocks_all_rows() {
        let maps = Arc::new(FakeMaps::with_places(&[("A Rd", GeoPoint::new(0.0, 0.0))]));
        let mut dash = dashboard(&["A Rd", "B Rd", "C Rd"]);
        let (report, session) = run(maps.clone(), &mut dash).await;

        assert_eq!(report.aborted, Some(labels::STORE_LOCATION_ERROR));
        for row in &dash.rows {
            assert_eq!(row.distance.text_or(""), labels::STORE_LOCATION_ERROR);
            assert_eq!(row.duration.text_or(""), labels::STORE_LOCATION_ERROR);
        }
        // the store lookup only
        assert_eq!(maps.geocode_calls.load(Ordering::SeqCst), 1);
        assert_eq!(maps.route_calls.load(Ordering::SeqCst), 0);
        assert!(session.store().is_none());
    }

    #[tokio::test]
    async fn test_rejected_key_uses_maps_api_label() {
        let mut fake = FakeMaps::with_places(&[(STORE, store_point())]);
        fake.denied = true;
        let mut dash = dashboard(&["A Rd"]);
        let (report, _) = run(Arc::new(fake), &mut dash).await;
        assert_eq!(report.aborted, Some(labels::MAPS_AUTH_ERROR));
        assert_eq!(dash.rows[0].distance.text_or(""), "Maps API Error");
    }

    #[tokio::test]
    async fn test_empty_store_address_issues_no_lookups() {
        let maps = Arc::new(FakeMaps::default());
        let mut dash = dashboard(&["A Rd"]);
        dash.store_address = "   ".into();
        let (report, _) = run(maps.clone(), &mut dash).await;

        assert_eq!(report.aborted, Some(labels::NO_STORE_ADDRESS));
        assert_eq!(dash.rows[0].distance.text_or(""), "No store address");
        assert_eq!(maps.geocode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_row_address_is_skipped() {
        let maps = Arc::new(FakeMaps::with_places(&[(STORE, store_point())]));
        let mut dash = dashboard(&["", "  "]);
        let (report, session) = run(maps.clone(), &mut dash).await;

        assert_eq!(report.skipped, 2);
        assert_eq!(maps.geocode_calls.load(Ordering::SeqCst), 1);
        assert!(dash.rows.iter().all(|r| r.route_settled()));
        assert!(!report.viewport_fitted);
        assert!(session.canvas().viewport.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_addresses_are_looked_up_each_time() {
        let maps = Arc::new(FakeMaps::with_places(&[
            (STORE, store_point()),
            ("Same St", GeoPoint::new(-29.9, 30.9)),
        ]));
        let mut dash = dashboard(&["Same St", "Same St"]);
        run(maps.clone(), &mut dash).await;
        assert_eq!(maps.geocode_calls.load(Ordering::SeqCst), 3);
        assert_eq!(maps.route_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_every_row_reaches_a_terminal_state() {
        let mut fake = FakeMaps::with_places(&[
            (STORE, store_point()),
            ("A", GeoPoint::new(-29.7, 31.0)),
            ("B", GeoPoint::new(-29.9, 30.8)),
        ]);
        fake.routes_fail = true;
        let mut dash = dashboard(&["A", "missing", "B", ""]);
        let (report, mut session) = run(Arc::new(fake), &mut dash).await;

        assert!(dash.rows.iter().all(|r| r.route_settled()));
        assert_eq!(report.resolved(), 2);

        session.switch_view(ViewMode::Heatmap);
        assert_eq!(session.canvas().heatmap.as_ref().map(|h| h.points.len()), Some(2));
    }

    /// Geocodes that answer after a per-address delay.
    struct SlowMaps {
        places: HashMap<&'static str, (GeoPoint, u64)>,
    }

    #[async_trait]
    impl MapsProvider for SlowMaps {
        async fn geocode(&self, address: &str) -> GeocodeOutcome {
            match self.places.get(address) {
                Some((point, delay_ms)) => {
                    tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                    GeocodeOutcome::Resolved(*point)
                }
                None => GeocodeOutcome::Failed(GeoError::NoResults),
            }
        }

        async fn driving_route(&self, _origin: GeoPoint, destination: GeoPoint) -> RouteOutcome {
            RouteOutcome::Found(RouteLeg {
                distance_text: format!("{:.1}", destination.lat),
                distance_meters: 0,
                duration_text: "1 min".into(),
                duration_seconds: 60,
            })
        }
    }

    #[tokio::test]
    async fn test_rows_finishing_out_of_order_land_on_their_own_row() {
        let maps = SlowMaps {
            places: HashMap::from([
                (STORE, (store_point(), 0)),
                ("slow", (GeoPoint::new(-29.1, 31.0), 300)),
                ("mid", (GeoPoint::new(-29.2, 31.0), 150)),
                ("fast", (GeoPoint::new(-29.3, 31.0), 10)),
            ]),
        };
        let mut dash = dashboard(&["slow", "missing", "mid", "fast"]);

        let started = std::time::Instant::now();
        let pipeline = EnrichmentPipeline::new(Arc::new(maps));
        let mut session = MapSession::new(LayerCanvas::new());
        let report = pipeline.run(&mut dash, &mut session).await;
        let elapsed = started.elapsed();

        let texts: Vec<_> = dash.rows.iter().map(|r| r.distance.text_or("")).collect();
        assert_eq!(texts, vec!["-29.1", labels::GEOCODING_FAILED, "-29.2", "-29.3"]);

        let titles: Vec<_> = session.markers().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["fast", "mid", "slow"]);
        assert_eq!(report.driving, 3);
        assert!(report.viewport_fitted);

        // bounded by the slowest row, not the sum of all rows
        assert!(elapsed >= std::time::Duration::from_millis(300), "{:?}", elapsed);
        assert!(elapsed < std::time::Duration::from_millis(450), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_enrich_row_transport_error() {
        struct Offline;

        #[async_trait]
        impl MapsProvider for Offline {
            async fn geocode(&self, _address: &str) -> GeocodeOutcome {
                GeocodeOutcome::Failed(GeoError::Network(NetworkError::Timeout))
            }
            async fn driving_route(&self, _o: GeoPoint, _d: GeoPoint) -> RouteOutcome {
                RouteOutcome::Failed(GeoError::NoRoute("NOT_FOUND".into()))
            }
        }

        let outcome = enrich_row(&Offline, store_point(), "A").await;
        assert!(matches!(outcome, RowOutcome::Unresolved(GeoError::Network(_))));
        assert!(outcome.position().is_none());
    }
}
