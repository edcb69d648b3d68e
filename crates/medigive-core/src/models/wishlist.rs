//! Clinic wishlist models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How urgently a clinic needs an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Urgency {
    Critical,
    High,
    Standard,
}

impl Urgency {
    pub fn label(self) -> &'static str {
        match self {
            Urgency::Critical => "Critical",
            Urgency::High => "High",
            Urgency::Standard => "Standard",
        }
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Urgency::Critical),
            "high" => Ok(Urgency::High),
            "standard" => Ok(Urgency::Standard),
            other => Err(format!("unknown urgency: {}", other)),
        }
    }
}

/// One outstanding medicine need of a clinic.
///
/// Invariant: `quantity_fulfilled < quantity_needed` for every item present in
/// a wishlist; an item reaching its target is removed, never kept at 100%.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: String,
    pub medicine_name: String,
    pub quantity_needed: u32,
    pub quantity_fulfilled: u32,
    pub urgency: Urgency,
}

impl WishlistItem {
    /// Create a new, unfulfilled item. Returns `None` for a zero quantity.
    pub fn new(medicine_name: String, quantity_needed: u32, urgency: Urgency) -> Option<Self> {
        if quantity_needed == 0 {
            return None;
        }
        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            medicine_name,
            quantity_needed,
            quantity_fulfilled: 0,
            urgency,
        })
    }

    /// Units still outstanding.
    pub fn remaining(&self) -> u32 {
        self.quantity_needed.saturating_sub(self.quantity_fulfilled)
    }

    /// True once the target is reached.
    pub fn is_met(&self) -> bool {
        self.quantity_fulfilled >= self.quantity_needed
    }

    /// Progress as a fraction in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        f64::from(self.quantity_fulfilled.min(self.quantity_needed)) / f64::from(self.quantity_needed.max(1))
    }
}
