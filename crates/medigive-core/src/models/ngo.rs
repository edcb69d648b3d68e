//! Clinic (NGO) models.

use serde::{Deserialize, Serialize};

use super::wishlist::{Urgency, WishlistItem};

/// A verified clinic receiving donations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ngo {
    pub id: String,
    pub name: String,
    pub location: String,
    pub verified: bool,
    pub impact_score: f64,
    /// Logo image URL
    pub logo: String,
    /// Ordered; order affects display, not matching
    pub wishlist: Vec<WishlistItem>,
}

impl Ngo {
    /// Find a wishlist item by ID.
    pub fn find_item(&self, item_id: &str) -> Option<&WishlistItem> {
        self.wishlist.iter().find(|w| w.id == item_id)
    }

    /// Total units still needed across the wishlist.
    pub fn outstanding_units(&self) -> u32 {
        self.wishlist.iter().map(WishlistItem::remaining).sum()
    }
}

fn seed_item(id: &str, name: &str, needed: u32, fulfilled: u32, urgency: Urgency) -> WishlistItem {
    WishlistItem {
        id: id.into(),
        medicine_name: name.into(),
        quantity_needed: needed,
        quantity_fulfilled: fulfilled,
        urgency,
    }
}

/// Clinics present on first start, before anything has been persisted.
pub fn seed_ngos() -> Vec<Ngo> {
    vec![
        Ngo {
            id: "ngo1".into(),
            name: "St. Mary Community Clinic".into(),
            location: "Downtown District".into(),
            verified: true,
            impact_score: 98.0,
            logo: "https://images.unsplash.com/photo-1538108197017-c1a966bd3912?w=100&h=100&fit=crop".into(),
            wishlist: vec![
                seed_item("w1", "Metformin", 10, 3, Urgency::Critical),
                seed_item("w2", "Amoxicillin", 5, 0, Urgency::High),
            ],
        },
        Ngo {
            id: "ngo2".into(),
            name: "Hope Wellness Foundation".into(),
            location: "East Side".into(),
            verified: true,
            impact_score: 85.0,
            logo: "https://images.unsplash.com/photo-1516549655169-df83a0774514?w=100&h=100&fit=crop".into(),
            wishlist: vec![seed_item("w3", "Paracetamol", 20, 12, Urgency::Standard)],
        },
    ]
}
