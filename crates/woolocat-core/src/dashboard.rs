//! Page model for the shipping-address table.
//!
//! One [`Row`] per distinct shipping address. The distance, duration and
//! weather cells start out pending and are filled in place as lookups
//! complete; rows are never removed during a page lifetime.

use serde::Serialize;

use crate::labels;

/// State of one lazily-populated table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Cell {
    /// Lookup issued (or not yet issued); shows the column placeholder.
    #[default]
    Pending,
    /// Lookup finished with a value.
    Ready { text: String, title: Option<String> },
    /// Lookup finished with an error label. Final.
    Error { label: String },
}

impl Cell {
    pub fn ready(text: impl Into<String>, title: impl Into<String>) -> Self {
        Self::Ready {
            text: text.into(),
            title: Some(title.into()),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::Ready {
            text: text.into(),
            title: None,
        }
    }

    pub fn error(label: impl Into<String>) -> Self {
        Self::Error {
            label: label.into(),
        }
    }

    /// True once the cell reached a value or an error label.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Text to display, using `placeholder` while pending.
    pub fn text_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self {
            Self::Pending => placeholder,
            Self::Ready { text, .. } => text,
            Self::Error { label } => label,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Ready { title, .. } => title.as_deref(),
            _ => None,
        }
    }
}

/// One distinct shipping address grouping.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub address: String,
    pub order_count: usize,
    pub revenue: f64,
    pub formatted_revenue: String,
    /// Serialized order list backing the "view orders" action.
    pub orders_json: String,
    pub distance: Cell,
    pub duration: Cell,
    pub weather: Cell,
}

impl Row {
    pub fn new(
        address: impl Into<String>,
        order_count: usize,
        revenue: f64,
        formatted_revenue: impl Into<String>,
        orders_json: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            order_count,
            revenue,
            formatted_revenue: formatted_revenue.into(),
            orders_json: orders_json.into(),
            distance: Cell::Pending,
            duration: Cell::Pending,
            weather: Cell::Pending,
        }
    }

    /// Location string handed to the weather lookup.
    pub fn weather_location(&self) -> &str {
        self.address.trim()
    }

    /// Put the same error label in the distance and duration cells.
    pub fn fail_route(&mut self, label: &str) {
        self.distance = Cell::error(label);
        self.duration = Cell::error(label);
    }

    pub fn route_settled(&self) -> bool {
        self.distance.is_terminal() && self.duration.is_terminal()
    }
}

/// The whole page: store address plus the address rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub store_address: String,
    pub rows: Vec<Row>,
}

impl Dashboard {
    pub fn new(store_address: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            store_address: store_address.into(),
            rows,
        }
    }

    /// Blanket failure across every distance/duration cell.
    pub fn fail_all_routes(&mut self, label: &str) {
        tracing::warn!("Marking all {} rows with '{}'", self.rows.len(), label);
        for row in &mut self.rows {
            row.fail_route(label);
        }
    }

    /// Render the table as plain text columns.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<48} {:>14} {:>22} {:>6} {:>14}  {}\n",
            "Location", "Distance", "Est. Delivery Time", "Orders", "Revenue", "Weather"
        ));
        for row in &self.rows {
            out.push_str(&format!(
                "{:<48} {:>14} {:>22} {:>6} {:>14}  {}\n",
                row.address,
                row.distance.text_or(labels::CALCULATING),
                row.duration.text_or(labels::CALCULATING),
                row.order_count,
                row.formatted_revenue,
                row.weather.text_or(labels::CHECKING_WEATHER),
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn row(address: &str) -> Row {
        Row::new(address, 1, 10.0, "R10.00", "[]")
    }

    #[test]
    fn test_new_row_is_pending() {
        let r = row("1 Main Rd, Durban");
        assert_eq!(r.distance, Cell::Pending);
        assert!(!r.route_settled());
        assert_eq!(r.weather.text_or(labels::CHECKING_WEATHER), "Checking weather...");
    }

    #[test]
    fn test_fail_route_sets_both_cells() {
        let mut r = row("x");
        r.fail_route(labels::GEOCODING_FAILED);
        assert!(r.distance.is_error());
        assert!(r.duration.is_error());
        assert!(r.route_settled());
        assert_eq!(r.duration.text_or(""), "Geocoding failed");
    }

    #[test]
    fn test_fail_all_routes() {
        let mut d = Dashboard::new("", vec![row("a"), row("b")]);
        d.fail_all_routes(labels::NO_STORE_ADDRESS);
        assert!(d.rows.iter().all(|r| r.distance.is_error() && r.duration.is_error()));
    }

    #[test]
    fn test_ready_cell_title() {
        let c = Cell::ready("12 km", labels::DRIVING_DISTANCE_TITLE);
        assert_eq!(c.title(), Some("Actual driving distance"));
        assert_eq!(Cell::plain("Rain").title(), None);
    }

    #[test]
    fn test_render_table_uses_placeholders() {
        let d = Dashboard::new("store", vec![row("1 Main Rd")]);
        let table = d.render_table();
        assert!(table.contains("Calculating..."));
        assert!(table.contains("1 Main Rd"));
    }
}
