//! Medicine directory models.

use serde::{Deserialize, Deserializer, Serialize};

/// A single row of the medicine directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRecord {
    /// Unique, stable identifier
    pub id: i64,
    /// Product display name
    pub brand_name: String,
    /// Manufacturer name
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Price exactly as stored; may be missing or not a number
    #[serde(default, deserialize_with = "deserialize_raw_price")]
    pub price: Option<String>,
    /// Pack size label (e.g., "10 tablets")
    #[serde(default)]
    pub pack_size: Option<String>,
    /// Active ingredients (e.g., "Paracetamol (500mg)")
    #[serde(default)]
    pub composition: Option<String>,
    /// Product description
    #[serde(default)]
    pub description: Option<String>,
    /// Discontinued records are never returned by a search
    #[serde(default)]
    pub discontinued: bool,
}

impl MedicineRecord {
    /// Create a new record with required fields.
    pub fn new(id: i64, brand_name: String) -> Self {
        Self {
            id,
            brand_name,
            manufacturer: None,
            price: None,
            pack_size: None,
            composition: None,
            description: None,
            discontinued: false,
        }
    }

    /// Parsed price, `None` when unknown.
    pub fn price_value(&self) -> Option<f64> {
        self.price.as_deref().and_then(parse_price)
    }

    /// Composition usable as an alternatives key (present and not blank).
    pub fn composition_key(&self) -> Option<&str> {
        self.composition
            .as_deref()
            .filter(|composition| !composition.trim().is_empty())
    }
}

/// Parse a stored price into a decimal amount.
///
/// Returns `None` for blank, non-numeric, non-finite, and zero values. A zero
/// price in the directory means the price was never filled in.
pub fn parse_price(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if value.is_finite() && value != 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Accept numbers, strings, or null for `price` in imported JSON.
fn deserialize_raw_price<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "price must be a number, string or null, got {}",
            other
        ))),
    }
}
