//! Donation and claim models.

use serde::{Deserialize, Serialize};

use super::medicine::MedicineRecord;

/// Lifecycle status shared by donations and claims.
///
/// Declaration order is the total order: `Uploaded < Verified < Accepted <
/// PickedUp < Delivered`. `Verified` is reserved and never produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DonationStatus {
    Uploaded,
    Verified,
    Accepted,
    #[serde(rename = "Picked Up")]
    PickedUp,
    Delivered,
}

/// Rungs walked by delivery progression.
pub const DELIVERY_SEQUENCE: [DonationStatus; 3] = [
    DonationStatus::Accepted,
    DonationStatus::PickedUp,
    DonationStatus::Delivered,
];

impl DonationStatus {
    /// Next rung of the delivery sequence, if any.
    pub fn next_delivery_step(self) -> Option<Self> {
        let idx = DELIVERY_SEQUENCE.iter().position(|s| *s == self)?;
        DELIVERY_SEQUENCE.get(idx + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == DonationStatus::Delivered
    }

    /// Human-readable label (matches the wire form).
    pub fn label(self) -> &'static str {
        match self {
            DonationStatus::Uploaded => "Uploaded",
            DonationStatus::Verified => "Verified",
            DonationStatus::Accepted => "Accepted",
            DonationStatus::PickedUp => "Picked Up",
            DonationStatus::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A donor's offered medicine, tracked through delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub donor_id: String,
    pub medicine: MedicineRecord,
    pub status: DonationStatus,
    /// Creation timestamp (RFC 3339)
    pub timestamp: String,
    /// Pickup address
    pub address: String,
    /// Present iff the donation was targeted or later claimed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ngo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ngo_name: Option<String>,
}

impl Donation {
    /// Create a new donation at the given initial status.
    pub fn new(donor_id: String, medicine: MedicineRecord, address: String, status: DonationStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            donor_id,
            medicine,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            address,
            ngo_id: None,
            ngo_name: None,
        }
    }

    /// True once a clinic is attached.
    pub fn is_targeted(&self) -> bool {
        self.ngo_id.is_some()
    }
}

/// A clinic's commitment to receive a specific donation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub donation_id: String,
    pub ngo_name: String,
    pub shipping_address: String,
    pub payment_method: String,
    pub status: DonationStatus,
    /// Creation timestamp (RFC 3339)
    pub timestamp: String,
    pub medicine_name: String,
}

/// Logistics details a clinic supplies when claiming.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimDetails {
    pub ngo_id: String,
    pub ngo_name: String,
    pub shipping_address: String,
    pub payment_method: String,
}

impl Claim {
    /// Create a claim at `Accepted` for the given donation.
    pub fn accepted(donation: &Donation, ngo_name: String, shipping_address: String, payment_method: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            donation_id: donation.id.clone(),
            ngo_name,
            shipping_address,
            payment_method,
            status: DonationStatus::Accepted,
            timestamp: chrono::Utc::now().to_rfc3339(),
            medicine_name: donation.medicine.name.clone(),
        }
    }
}
