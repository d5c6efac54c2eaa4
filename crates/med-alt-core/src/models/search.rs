//! Search response models.

use serde::{Deserialize, Serialize};

use super::MedicineRecord;

/// Shown in place of a missing composition.
pub const UNKNOWN_COMPOSITION: &str = "N/A";

/// A primary match together with its same-composition alternatives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: i64,
    pub brand_name: String,
    pub manufacturer: Option<String>,
    pub price: Option<f64>,
    pub pack_size: Option<String>,
    /// Composition, or "N/A" when the record has none
    pub chemical_content: String,
    pub description: Option<String>,
    /// Ordered by brand name, at most five entries
    pub alternatives: Vec<AlternativeResult>,
}

/// Reduced projection of a record offered as an alternative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeResult {
    pub id: i64,
    pub brand_name: String,
    pub manufacturer: Option<String>,
    pub price: Option<f64>,
    pub pack_size: Option<String>,
}

impl SearchResult {
    /// Build a result from a primary record and its alternatives.
    pub fn from_primary(record: MedicineRecord, alternatives: Vec<AlternativeResult>) -> Self {
        let price = record.price_value();
        let chemical_content = record
            .composition_key()
            .unwrap_or(UNKNOWN_COMPOSITION)
            .to_string();

        Self {
            id: record.id,
            brand_name: record.brand_name,
            manufacturer: record.manufacturer,
            price,
            pack_size: record.pack_size,
            chemical_content,
            description: record.description,
            alternatives,
        }
    }
}

impl From<MedicineRecord> for AlternativeResult {
    fn from(record: MedicineRecord) -> Self {
        let price = record.price_value();
        Self {
            id: record.id,
            brand_name: record.brand_name,
            manufacturer: record.manufacturer,
            price,
            pack_size: record.pack_size,
        }
    }
}
