//! Donation submission.

use log::{info, warn};

use crate::config::EngineConfig;
use crate::db::Dataset;
use crate::error::{CoreError, CoreResult};
use crate::ledger::{Cause, Subject};
use crate::matcher::{matches, reconcile, RequirementMet};
use crate::models::{Claim, Donation, DonationStatus, MedicineRecord, Notice};
use crate::state::AppState;

use super::Effects;

/// Shipping address recorded on claims created by targeted donations.
pub const DIRECT_SHIPPING_ADDRESS: &str = "Direct to Clinic Logistics Center";

/// Payment method recorded on claims created by targeted donations.
pub const DIRECT_PAYMENT_METHOD: &str = "NGO Internal Account";

/// Clinic (and optionally a specific need) a donation is aimed at.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationTarget {
    pub ngo_id: String,
    pub wishlist_item_id: Option<String>,
}

/// A scanned medicine ready to be donated.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub medicine: MedicineRecord,
    /// Pickup address
    pub address: String,
    pub target: Option<DonationTarget>,
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub donation_id: String,
    /// Present for targeted donations
    pub claim_id: Option<String>,
    /// The medicine did not match the targeted wishlist item
    pub mismatch: bool,
    pub requirement_met: Option<RequirementMet>,
}

/// Turn a scanned medicine into a donation.
///
/// Untargeted donations start at `Uploaded` and enter the marketplace.
/// Targeted donations skip the marketplace: donation and claim are created at
/// `Accepted` together and the clinic's wishlist is credited. A medicine that
/// does not match the targeted need only produces a warning.
pub fn submit_donation(
    state: &mut AppState,
    request: SubmitRequest,
    config: &EngineConfig,
    fx: &mut Effects,
) -> CoreResult<Submission> {
    let SubmitRequest {
        medicine,
        address,
        target,
    } = request;

    if config.require_pickup_address && address.trim().is_empty() {
        return Err(CoreError::Validation("pickup address is required".into()));
    }

    let Some(target) = target else {
        let donation = Donation::new(config.donor_id.clone(), medicine, address, DonationStatus::Uploaded);
        state
            .ledger
            .append(Subject::Donation, &donation.id, None, DonationStatus::Uploaded, Cause::Submitted)?;
        info!("Donation {} ({}) listed in marketplace", donation.id, donation.medicine.name);

        let donation_id = donation.id.clone();
        state.donations.insert(0, donation);
        fx.touch(Dataset::Donations);
        fx.touch(Dataset::History);

        return Ok(Submission {
            donation_id,
            claim_id: None,
            mismatch: false,
            requirement_met: None,
        });
    };

    let ngo_idx = state
        .ngo_index(&target.ngo_id)
        .ok_or_else(|| CoreError::NotFound(format!("clinic {}", target.ngo_id)))?;
    let ngo = &state.ngos[ngo_idx];

    let mut mismatch = false;
    if let Some(item_id) = &target.wishlist_item_id {
        match ngo.find_item(item_id) {
            Some(item) if !matches(&medicine.name, &item.medicine_name) => {
                mismatch = true;
                warn!(
                    "Donated {} does not match requested {} at {}",
                    medicine.name, item.medicine_name, ngo.id
                );
                fx.notify(Notice::warning(format!(
                    "Warning: Scanned medicine ({}) does not match requested {}.",
                    medicine.name, item.medicine_name
                )));
            }
            Some(_) => {}
            None => warn!("Targeted wishlist item {} no longer open at {}", item_id, ngo.id),
        }
    }

    let mut donation = Donation::new(config.donor_id.clone(), medicine, address, DonationStatus::Accepted);
    donation.ngo_id = Some(ngo.id.clone());
    donation.ngo_name = Some(ngo.name.clone());

    let claim = Claim::accepted(
        &donation,
        ngo.name.clone(),
        DIRECT_SHIPPING_ADDRESS.into(),
        DIRECT_PAYMENT_METHOD.into(),
    );

    // Credited by name even on mismatch
    let (updated_ngo, requirement_met) = reconcile(ngo, &donation.medicine.name);
    let ngo_name = ngo.name.clone();

    state
        .ledger
        .append(Subject::Donation, &donation.id, None, DonationStatus::Accepted, Cause::Submitted)?;
    state
        .ledger
        .append(Subject::Claim, &claim.id, None, DonationStatus::Accepted, Cause::Submitted)?;

    if updated_ngo != state.ngos[ngo_idx] {
        state.ngos[ngo_idx] = updated_ngo;
        fx.touch(Dataset::Ngos);
    }
    if let Some(event) = &requirement_met {
        fx.notify(Notice::success(event.message()));
    }
    fx.notify(Notice::success(format!(
        "Donation recorded for {}. Logistics assigned.",
        ngo_name
    )));

    info!(
        "Donation {} targeted at {} with claim {}",
        donation.id, ngo_name, claim.id
    );

    let submission = Submission {
        donation_id: donation.id.clone(),
        claim_id: Some(claim.id.clone()),
        mismatch,
        requirement_met,
    };

    state.claims.insert(0, claim);
    state.donations.insert(0, donation);
    fx.touch(Dataset::Donations);
    fx.touch(Dataset::Claims);
    fx.touch(Dataset::History);

    Ok(submission)
}
