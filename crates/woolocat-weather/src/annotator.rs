//! Fills the weather cell of every row.
//!
//! Each row is independent of the enrichment pipeline and of every other
//! row. No caching and no retries.

use std::sync::Arc;

use futures::future::join_all;
use woolocat_core::{labels, Cell, Dashboard};

use crate::transport::RelayTransport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    pub labelled: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub missing_location: usize,
}

pub struct WeatherAnnotator {
    transport: Arc<dyn RelayTransport>,
}

impl WeatherAnnotator {
    pub fn new(transport: Arc<dyn RelayTransport>) -> Self {
        Self { transport }
    }

    /// Weather cell for a single location string.
    pub async fn label_for(&self, location: &str) -> Cell {
        let location = location.trim();
        if location.is_empty() {
            return Cell::error(labels::NO_LOCATION_DATA);
        }

        match self.transport.request_weather(location).await {
            Ok(response) => match response.weather_label() {
                Some(label) => Cell::plain(label),
                None => Cell::plain(labels::WEATHER_UNAVAILABLE),
            },
            Err(e) => {
                tracing::error!("Weather API error for '{}': {}", location, e);
                Cell::error(labels::WEATHER_FETCH_ERROR)
            }
        }
    }

    pub async fn annotate(&self, dashboard: &mut Dashboard) -> AnnotationReport {
        let locations: Vec<String> = dashboard
            .rows
            .iter()
            .map(|r| r.weather_location().to_string())
            .collect();

        let cells = join_all(locations.iter().map(|l| self.label_for(l))).await;

        let mut report = AnnotationReport::default();
        for (row, cell) in dashboard.rows.iter_mut().zip(cells) {
            match &cell {
                Cell::Error { label } if label == labels::NO_LOCATION_DATA => {
                    report.missing_location += 1
                }
                Cell::Error { .. } => report.failed += 1,
                Cell::Ready { text, .. } if text == labels::WEATHER_UNAVAILABLE => {
                    report.unavailable += 1
                }
                _ => report.labelled += 1,
            }
            row.weather = cell;
        }

        tracing::info!(
            "Weather annotated: {} labelled, {} unavailable, {} failed",
            report.labelled,
            report.unavailable,
            report.failed
        );
        report
    }
}
