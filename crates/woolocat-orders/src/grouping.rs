//! Grouping shop orders into one row per shipping address.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use woolocat_core::Row;

use crate::order::{normalize_status, Order};

/// Statuses that count towards the dashboard
pub const COUNTED_STATUSES: [&str; 3] = ["completed", "processing", "on-hold"];

const ORDER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
}

impl ShippingAddress {
    /// Non-empty parts joined with `", "`.
    pub fn full_address(&self) -> String {
        [
            &self.address_1,
            &self.address_2,
            &self.city,
            &self.state,
            &self.postcode,
            &self.country,
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Order as exported from the shop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopOrder {
    pub id: u64,
    pub created: NaiveDateTime,
    pub status: String,
    pub total: f64,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub shipping: ShippingAddress,
}

impl ShopOrder {
    pub fn is_counted(&self) -> bool {
        COUNTED_STATUSES.contains(&normalize_status(&self.status))
    }

    fn to_order(&self, currency_symbol: &str) -> Order {
        Order {
            id: self.id.to_string(),
            date: self.created.format(ORDER_DATE_FORMAT).to_string(),
            status: self.status.clone(),
            total: format_price(self.total, currency_symbol),
            customer: self.customer.trim().to_string(),
        }
    }
}

/// `R1,234.50` style: symbol, thousands separators, two decimals.
pub fn format_price(amount: f64, symbol: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}{}.{:02}", sign, symbol, grouped, fraction)
}

struct Group {
    address: String,
    revenue: f64,
    orders: Vec<Order>,
}

/// One row per distinct shipping address, in first-seen order.
pub fn group_by_address(orders: &[ShopOrder], currency_symbol: &str) -> Vec<Row> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for order in orders.iter().filter(|o| o.is_counted()) {
        let address = order.shipping.full_address();
        let slot = *index.entry(address.clone()).or_insert_with(|| {
            groups.push(Group {
                address,
                revenue: 0.0,
                orders: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.revenue += order.total;
        group.orders.push(order.to_order(currency_symbol));
    }

    tracing::debug!(
        "Grouped {} orders into {} addresses",
        orders.len(),
        groups.len()
    );

    groups
        .into_iter()
        .map(|g| {
            let orders_json = serde_json::to_string(&g.orders).unwrap_or_else(|e| {
                tracing::error!("Failed to serialize orders for '{}': {}", g.address, e);
                "[]".to_string()
            });
            Row::new(
                g.address,
                g.orders.len(),
                g.revenue,
                format_price(g.revenue, currency_symbol),
                orders_json,
            )
        })
        .collect()
}
