//! Map state for one dashboard load.
//!
//! [`MapSession`] owns the store marker, the delivery markers and the
//! resolved positions produced by one pipeline run. Drawing is delegated to
//! a [`MapCanvas`]; the session only decides what is shown.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Bounds, GeoPoint};

pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: -29.8587,
    lng: 31.0218,
};
pub const DEFAULT_ZOOM: u8 = 12;

pub const HEATMAP_RADIUS: u32 = 20;
pub const HEATMAP_OPACITY: f64 = 0.8;
pub const HEATMAP_WEIGHT: f64 = 1.0;

pub const CLUSTER_RADIUS: u32 = 100;
pub const CLUSTER_MAX_ZOOM: u8 = 16;

/// Mutually exclusive map visualizations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Markers,
    Heatmap,
    Clusters,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Markers => "Map View",
            Self::Heatmap => "Heat Map",
            Self::Clusters => "Customer Clusters",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "map" | "markers" => Ok(Self::Markers),
            "heatmap" => Ok(Self::Heatmap),
            "clusters" => Ok(Self::Clusters),
            other => Err(format!("Unknown view mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Store,
    Delivery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: GeoPoint,
    pub title: String,
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedPoint {
    pub location: GeoPoint,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapLayer {
    pub points: Vec<WeightedPoint>,
    pub radius: u32,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterLayer {
    pub markers: Vec<Marker>,
    pub radius: u32,
    pub max_zoom: u8,
}

/// Rendering primitives of the mapping provider.
pub trait MapCanvas {
    fn add_marker(&mut self, marker: &Marker, visible: bool);
    /// Show every delivery marker. The store marker is never hidden.
    fn show_markers(&mut self);
    fn hide_markers(&mut self);
    fn show_heatmap(&mut self, layer: &HeatmapLayer);
    fn hide_heatmap(&mut self);
    fn show_clusters(&mut self, layer: &ClusterLayer);
    fn clear_clusters(&mut self);
    fn fit_bounds(&mut self, bounds: &Bounds);
}

/// Calls made against a [`LayerCanvas`], in order
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    AddMarker(MarkerKind),
    ShowMarkers,
    HideMarkers,
    ShowHeatmap(usize),
    HideHeatmap,
    ShowClusters(usize),
    ClearClusters,
    FitBounds,
}

/// Headless canvas that keeps the current layer state in memory.
#[derive(Debug, Clone)]
pub struct LayerCanvas {
    pub center: GeoPoint,
    pub zoom: u8,
    pub store_marker: Option<Marker>,
    pub delivery_markers: Vec<(Marker, bool)>,
    pub markers_layer: bool,
    pub heatmap: Option<HeatmapLayer>,
    pub clusters: Option<ClusterLayer>,
    pub viewport: Option<Bounds>,
    pub ops: Vec<CanvasOp>,
}

impl Default for LayerCanvas {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            store_marker: None,
            delivery_markers: Vec::new(),
            markers_layer: true,
            heatmap: None,
            clusters: None,
            viewport: None,
            ops: Vec::new(),
        }
    }
}

impl LayerCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers currently drawn on the map.
    pub fn visible_layers(&self) -> Vec<ViewMode> {
        let mut layers = Vec::new();
        if self.markers_layer {
            layers.push(ViewMode::Markers);
        }
        if self.heatmap.is_some() {
            layers.push(ViewMode::Heatmap);
        }
        if self.clusters.is_some() {
            layers.push(ViewMode::Clusters);
        }
        layers
    }

    pub fn visible_marker_count(&self) -> usize {
        self.delivery_markers.iter().filter(|(_, v)| *v).count()
    }

    /// One-paragraph description of what is on screen.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(store) = &self.store_marker {
            out.push_str(&format!("Store: {} {}\n", store.title, store.position));
        }
        match &self.viewport {
            Some(b) => out.push_str(&format!(
                "Viewport: ({:.4}, {:.4}) - ({:.4}, {:.4})\n",
                b.south(),
                b.west(),
                b.north(),
                b.east()
            )),
            None => out.push_str(&format!(
                "Viewport: centered on {} at zoom {}\n",
                self.center, self.zoom
            )),
        }
        if self.markers_layer {
            out.push_str(&format!("Markers: {} visible\n", self.visible_marker_count()));
        }
        if let Some(h) = &self.heatmap {
            out.push_str(&format!(
                "Heatmap: {} points, radius {}, opacity {}\n",
                h.points.len(),
                h.radius,
                h.opacity
            ));
        }
        if let Some(c) = &self.clusters {
            out.push_str(&format!(
                "Clusters: {} markers, radius {}, max zoom {}\n",
                c.markers.len(),
                c.radius,
                c.max_zoom
            ));
        }
        out
    }
}

impl MapCanvas for LayerCanvas {
    fn add_marker(&mut self, marker: &Marker, visible: bool) {
        self.ops.push(CanvasOp::AddMarker(marker.kind));
        match marker.kind {
            MarkerKind::Store => self.store_marker = Some(marker.clone()),
            MarkerKind::Delivery => self.delivery_markers.push((marker.clone(), visible)),
        }
    }

    fn show_markers(&mut self) {
        self.ops.push(CanvasOp::ShowMarkers);
        self.markers_layer = true;
        for (_, visible) in &mut self.delivery_markers {
            *visible = true;
        }
    }

    fn hide_markers(&mut self) {
        self.ops.push(CanvasOp::HideMarkers);
        self.markers_layer = false;
        for (_, visible) in &mut self.delivery_markers {
            *visible = false;
        }
    }

    fn show_heatmap(&mut self, layer: &HeatmapLayer) {
        self.ops.push(CanvasOp::ShowHeatmap(layer.points.len()));
        self.heatmap = Some(layer.clone());
    }

    fn hide_heatmap(&mut self) {
        self.ops.push(CanvasOp::HideHeatmap);
        self.heatmap = None;
    }

    fn show_clusters(&mut self, layer: &ClusterLayer) {
        self.ops.push(CanvasOp::ShowClusters(layer.markers.len()));
        self.clusters = Some(layer.clone());
    }

    fn clear_clusters(&mut self) {
        self.ops.push(CanvasOp::ClearClusters);
        self.clusters = None;
    }

    fn fit_bounds(&mut self, bounds: &Bounds) {
        self.ops.push(CanvasOp::FitBounds);
        self.viewport = Some(*bounds);
        self.center = bounds.center();
    }
}

/// Markers and layers for one pipeline run.
pub struct MapSession<C: MapCanvas> {
    canvas: C,
    store: Option<Marker>,
    markers: Vec<Marker>,
    bounds: Option<Bounds>,
    mode: ViewMode,
}

impl<C: MapCanvas> MapSession<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            store: None,
            markers: Vec::new(),
            bounds: None,
            mode: ViewMode::Markers,
        }
    }

    pub fn set_store(&mut self, position: GeoPoint, title: &str) {
        let marker = Marker {
            position,
            title: title.to_string(),
            kind: MarkerKind::Store,
        };
        self.canvas.add_marker(&marker, true);
        self.extend_bounds(position);
        self.store = Some(marker);
    }

    pub fn add_row_marker(&mut self, position: GeoPoint, address: &str) {
        let marker = Marker {
            position,
            title: address.to_string(),
            kind: MarkerKind::Delivery,
        };
        self.canvas.add_marker(&marker, self.mode == ViewMode::Markers);
        self.extend_bounds(position);
        self.markers.push(marker);
    }

    fn extend_bounds(&mut self, position: GeoPoint) {
        match &mut self.bounds {
            Some(b) => b.extend(position),
            None => self.bounds = Some(Bounds::from_point(position)),
        }
    }

    /// Fit the viewport around the store and every resolved row.
    ///
    /// No-op until at least one row resolved. Safe to call repeatedly.
    pub fn refit_viewport(&mut self) -> bool {
        if self.markers.is_empty() {
            return false;
        }
        match self.bounds {
            Some(bounds) => {
                self.canvas.fit_bounds(&bounds);
                true
            }
            None => false,
        }
    }

    /// Switch the visualization, tearing down the active layer first.
    pub fn switch_view(&mut self, next: ViewMode) {
        tracing::debug!("Switching map view {:?} -> {:?}", self.mode, next);

        match self.mode {
            ViewMode::Markers => self.canvas.hide_markers(),
            ViewMode::Heatmap => self.canvas.hide_heatmap(),
            ViewMode::Clusters => self.canvas.clear_clusters(),
        }

        match next {
            ViewMode::Markers => self.canvas.show_markers(),
            ViewMode::Heatmap => {
                let layer = HeatmapLayer {
                    points: self
                        .resolved_positions()
                        .into_iter()
                        .map(|location| WeightedPoint {
                            location,
                            weight: HEATMAP_WEIGHT,
                        })
                        .collect(),
                    radius: HEATMAP_RADIUS,
                    opacity: HEATMAP_OPACITY,
                };
                self.canvas.show_heatmap(&layer);
            }
            ViewMode::Clusters => {
                let layer = ClusterLayer {
                    markers: self.markers.clone(),
                    radius: CLUSTER_RADIUS,
                    max_zoom: CLUSTER_MAX_ZOOM,
                };
                self.canvas.show_clusters(&layer);
            }
        }

        self.mode = next;
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn store(&self) -> Option<&Marker> {
        self.store.as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn resolved_positions(&self) -> Vec<GeoPoint> {
        self.markers.iter().map(|m| m.position).collect()
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }
}
