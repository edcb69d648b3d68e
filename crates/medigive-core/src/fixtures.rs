//! Shared builders for unit tests.

use crate::config::EngineConfig;
use crate::models::MedicineRecord;
use crate::state::AppState;

pub fn medicine(name: &str) -> MedicineRecord {
    MedicineRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.into(),
        dosage: "500mg".into(),
        manufacturer: "Sun Pharma".into(),
        expiry_date: "2027-08-31".into(),
        is_sealed: true,
        is_unexpired: true,
        confidence: 0.92,
        image_ref: None,
    }
}

pub fn state() -> AppState {
    AppState::seeded()
}

pub fn config() -> EngineConfig {
    EngineConfig::default()
}
