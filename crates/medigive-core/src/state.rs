//! Application state aggregate.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::db::{Database, Dataset, DbResult};
use crate::ledger::Ledger;
use crate::matcher::matches;
use crate::models::{seed_ngos, Claim, Donation, DonationStatus, Ngo, Urgency};

/// Every collection the lifecycle mutates, held together so a transition can
/// be applied to a copy and committed as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    /// Newest first
    pub donations: Vec<Donation>,
    /// Newest first
    pub claims: Vec<Claim>,
    pub ngos: Vec<Ngo>,
    pub ledger: Ledger,
}

impl AppState {
    /// Fresh state with the seeded clinics.
    pub fn seeded() -> Self {
        Self {
            ngos: seed_ngos(),
            ..Default::default()
        }
    }

    /// Load every dataset; clinics fall back to the seed on first start.
    pub fn load(db: &Database) -> DbResult<Self> {
        let donations = db.load_dataset(Dataset::Donations)?.unwrap_or_default();
        let claims = db.load_dataset(Dataset::Claims)?.unwrap_or_default();
        let ledger = db.load_dataset(Dataset::History)?.unwrap_or_default();
        let ngos = match db.load_dataset::<Vec<Ngo>>(Dataset::Ngos)? {
            Some(ngos) => ngos.into_iter().map(drop_invalid_items).collect(),
            None => {
                info!("No clinics persisted yet, using seed data");
                seed_ngos()
            }
        };
        Ok(Self {
            donations,
            claims,
            ngos,
            ledger,
        })
    }

    pub fn donation(&self, donation_id: &str) -> Option<&Donation> {
        self.donations.iter().find(|d| d.id == donation_id)
    }

    pub fn claim(&self, claim_id: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.id == claim_id)
    }

    pub fn ngo(&self, ngo_id: &str) -> Option<&Ngo> {
        self.ngos.iter().find(|n| n.id == ngo_id)
    }

    /// The claim paired with a donation, if it has been claimed.
    pub fn claim_for_donation(&self, donation_id: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.donation_id == donation_id)
    }

    pub(crate) fn donation_index(&self, donation_id: &str) -> Option<usize> {
        self.donations.iter().position(|d| d.id == donation_id)
    }

    pub(crate) fn claim_index(&self, claim_id: &str) -> Option<usize> {
        self.claims.iter().position(|c| c.id == claim_id)
    }

    pub(crate) fn ngo_index(&self, ngo_id: &str) -> Option<usize> {
        self.ngos.iter().position(|n| n.id == ngo_id)
    }

    /// Unclaimed donations open to every clinic, newest first.
    pub fn marketplace(&self) -> Vec<&Donation> {
        self.donations
            .iter()
            .filter(|d| d.status == DonationStatus::Uploaded)
            .filter(|d| self.claim_for_donation(&d.id).is_none())
            .collect()
    }

    /// Donations made by one donor, newest first.
    pub fn donations_for_donor(&self, donor_id: &str) -> Vec<&Donation> {
        self.donations
            .iter()
            .filter(|d| d.donor_id == donor_id)
            .collect()
    }

    /// Claims held by a clinic, newest first.
    pub fn claims_for_ngo(&self, ngo_name: &str) -> Vec<&Claim> {
        self.claims
            .iter()
            .filter(|c| c.ngo_name == ngo_name)
            .collect()
    }

    /// Claims still moving through delivery.
    pub fn active_claims(&self) -> Vec<&Claim> {
        self.claims
            .iter()
            .filter(|c| !c.status.is_terminal())
            .collect()
    }

    /// Clinics with an open need matching `medicine_name`, most urgent first.
    ///
    /// Ties keep clinic list order.
    pub fn clinics_needing(&self, medicine_name: &str) -> Vec<&Ngo> {
        let mut found: Vec<(Urgency, usize, &Ngo)> = self
            .ngos
            .iter()
            .enumerate()
            .filter_map(|(pos, ngo)| {
                ngo.wishlist
                    .iter()
                    .filter(|w| matches(&w.medicine_name, medicine_name))
                    .map(|w| w.urgency)
                    .min_by_key(|u| urgency_rank(*u))
                    .map(|u| (u, pos, ngo))
            })
            .collect();
        found.sort_by_key(|(u, pos, _)| (urgency_rank(*u), *pos));
        found.into_iter().map(|(_, _, ngo)| ngo).collect()
    }
}

fn urgency_rank(urgency: Urgency) -> u8 {
    match urgency {
        Urgency::Critical => 0,
        Urgency::High => 1,
        Urgency::Standard => 2,
    }
}

/// Open wishlist items need a positive target that is not yet reached.
fn drop_invalid_items(mut ngo: Ngo) -> Ngo {
    ngo.wishlist.retain(|item| {
        let valid = item.quantity_needed > 0 && item.quantity_fulfilled < item.quantity_needed;
        if !valid {
            warn!(
                "Dropping wishlist item {} of {} ({}/{} fulfilled)",
                item.id, ngo.id, item.quantity_fulfilled, item.quantity_needed
            );
        }
        valid
    });
    ngo
}
