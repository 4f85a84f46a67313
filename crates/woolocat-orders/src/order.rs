use serde::{Deserialize, Deserializer, Serialize};

use crate::error::OrderListError;

/// One order as embedded in a row's serialized list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub date: String,
    pub status: String,
    /// Already formatted with currency
    pub total: String,
    pub customer: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Strip the `wc-` prefix the shop puts on stored statuses.
pub fn normalize_status(status: &str) -> &str {
    status.strip_prefix("wc-").unwrap_or(status)
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Parse a serialized order list.
///
/// Anything other than a JSON array of orders is an error; nothing is
/// returned for a partially valid list.
pub fn parse_order_list(raw: &str) -> Result<Vec<Order>, OrderListError> {
    if raw.trim().is_empty() {
        return Err(OrderListError::Missing);
    }

    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_array() {
        return Err(OrderListError::NotAList(kind_of(&value)));
    }

    Ok(serde_json::from_value(value)?)
}
