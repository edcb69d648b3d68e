//! Medicine record produced by packaging analysis.

use medigive_vision::MedicineAnalysis;
use serde::{Deserialize, Serialize};

/// Structured attributes of one scanned medicine package.
///
/// Immutable once produced; owned by exactly one donation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRecord {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub manufacturer: String,
    /// ISO `YYYY-MM-DD`
    pub expiry_date: String,
    pub is_sealed: bool,
    pub is_unexpired: bool,
    /// Extraction confidence in `0.0..=1.0`
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl MedicineRecord {
    /// Build a record from a validated analysis.
    pub fn from_analysis(analysis: MedicineAnalysis, image_ref: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: analysis.name,
            dosage: analysis.dosage,
            manufacturer: analysis.manufacturer,
            expiry_date: analysis.expiry_date.format("%Y-%m-%d").to_string(),
            is_sealed: analysis.is_sealed,
            is_unexpired: analysis.is_unexpired,
            confidence: analysis.confidence,
            image_ref,
        }
    }

    /// Display label, e.g. "Metformin 500mg".
    pub fn label(&self) -> String {
        if self.dosage.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.dosage)
        }
    }
}
