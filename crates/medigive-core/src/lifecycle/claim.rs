//! Clinic claims on marketplace donations.

use log::info;

use crate::db::Dataset;
use crate::error::{CoreError, CoreResult};
use crate::ledger::{Cause, Subject};
use crate::matcher::{reconcile, RequirementMet};
use crate::models::{Claim, ClaimDetails, DonationStatus, Notice};
use crate::state::AppState;

use super::{advance_status, require_non_empty, Effects};

/// Result of claiming a donation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimOutcome {
    pub claim_id: String,
    pub requirement_met: Option<RequirementMet>,
}

/// Claim an unclaimed `Uploaded` donation for a clinic.
///
/// Creates the paired claim at `Accepted`, moves the donation to `Accepted`,
/// stamps the clinic on it and credits the clinic's wishlist once.
pub fn claim_donation(
    state: &mut AppState,
    donation_id: &str,
    details: ClaimDetails,
    fx: &mut Effects,
) -> CoreResult<ClaimOutcome> {
    require_non_empty("clinic name", &details.ngo_name)?;
    require_non_empty("shipping address", &details.shipping_address)?;
    require_non_empty("payment method", &details.payment_method)?;

    let donation_idx = state
        .donation_index(donation_id)
        .ok_or_else(|| CoreError::NotFound(format!("donation {}", donation_id)))?;
    if state.claim_for_donation(donation_id).is_some()
        || state.donations[donation_idx].status != DonationStatus::Uploaded
    {
        return Err(CoreError::AlreadyClaimed(donation_id.to_string()));
    }
    let ngo_idx = state
        .ngo_index(&details.ngo_id)
        .ok_or_else(|| CoreError::NotFound(format!("clinic {}", details.ngo_id)))?;

    let donation = &mut state.donations[donation_idx];
    advance_status(
        &mut state.ledger,
        Subject::Donation,
        donation_id,
        &mut donation.status,
        DonationStatus::Accepted,
        Cause::Claimed,
    )?;
    donation.ngo_id = Some(details.ngo_id.clone());
    donation.ngo_name = Some(details.ngo_name.clone());

    let claim = Claim::accepted(
        donation,
        details.ngo_name,
        details.shipping_address,
        details.payment_method,
    );
    state
        .ledger
        .append(Subject::Claim, &claim.id, None, DonationStatus::Accepted, Cause::Claimed)?;

    let medicine_name = claim.medicine_name.clone();
    let (updated_ngo, requirement_met) = reconcile(&state.ngos[ngo_idx], &medicine_name);
    if updated_ngo != state.ngos[ngo_idx] {
        state.ngos[ngo_idx] = updated_ngo;
        fx.touch(Dataset::Ngos);
    }
    if let Some(event) = &requirement_met {
        fx.notify(Notice::success(event.message()));
    }
    fx.notify(Notice::success(format!("Claim confirmed for {}", medicine_name)));

    info!(
        "Donation {} claimed by {} (claim {})",
        donation_id, claim.ngo_name, claim.id
    );

    let claim_id = claim.id.clone();
    state.claims.insert(0, claim);
    fx.touch(Dataset::Donations);
    fx.touch(Dataset::Claims);
    fx.touch(Dataset::History);

    Ok(ClaimOutcome {
        claim_id,
        requirement_met,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{config, medicine, state};
    use crate::lifecycle::{submit_donation, SubmitRequest};

    fn details() -> ClaimDetails {
        ClaimDetails {
            ngo_id: "ngo1".into(),
            ngo_name: "St. Mary Community Clinic".into(),
            shipping_address: "4 Harbor Road".into(),
            payment_method: "Card".into(),
        }
    }

    fn listed(state: &mut AppState, name: &str) -> String {
        let request = SubmitRequest {
            medicine: medicine(name),
            address: "12 Elm Street".into(),
            target: None,
        };
        submit_donation(state, request, &config(), &mut Effects::default())
            .unwrap()
            .donation_id
    }

    #[test]
    fn test_claim_accepts_and_pairs() {
        let mut state = state();
        let donation_id = listed(&mut state, "Metformin");
        let mut fx = Effects::default();

        let outcome = claim_donation(&mut state, &donation_id, details(), &mut fx).unwrap();

        let donation = state.donation(&donation_id).unwrap();
        let claim = state.claim(&outcome.claim_id).unwrap();
        assert_eq!(donation.status, DonationStatus::Accepted);
        assert_eq!(claim.status, DonationStatus::Accepted);
        assert_eq!(claim.donation_id, donation_id);
        assert_eq!(claim.medicine_name, "Metformin");
        assert_eq!(claim.shipping_address, "4 Harbor Road");
        assert_eq!(donation.ngo_id.as_deref(), Some("ngo1"));
        assert_eq!(donation.ngo_name.as_deref(), Some("St. Mary Community Clinic"));
        assert!(state.marketplace().is_empty());

        // One reconciliation: Metformin 3 -> 4
        assert_eq!(state.ngo("ngo1").unwrap().find_item("w1").unwrap().quantity_fulfilled, 4);
        assert_eq!(fx.notices.last().unwrap().message, "Claim confirmed for Metformin");
    }

    #[test]
    fn test_second_claim_rejected() {
        let mut state = state();
        let donation_id = listed(&mut state, "Metformin");
        claim_donation(&mut state, &donation_id, details(), &mut Effects::default()).unwrap();

        let err = claim_donation(&mut state, &donation_id, details(), &mut Effects::default()).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyClaimed(_)));
        assert_eq!(state.claims.len(), 1);
        assert_eq!(state.ngo("ngo1").unwrap().find_item("w1").unwrap().quantity_fulfilled, 4);
    }

    #[test]
    fn test_missing_details_rejected() {
        let mut state = state();
        let donation_id = listed(&mut state, "Metformin");

        for broken in [
            ClaimDetails { ngo_name: String::new(), ..details() },
            ClaimDetails { shipping_address: " ".into(), ..details() },
            ClaimDetails { payment_method: String::new(), ..details() },
        ] {
            let err = claim_donation(&mut state, &donation_id, broken, &mut Effects::default()).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput(_)));
        }
        assert!(state.claims.is_empty());
    }

    #[test]
    fn test_unknown_donation() {
        let mut state = state();
        let err = claim_donation(&mut state, "nope", details(), &mut Effects::default()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_targeted_donation_cannot_be_claimed() {
        let mut state = state();
        let request = SubmitRequest {
            medicine: medicine("Metformin"),
            address: "12 Elm Street".into(),
            target: Some(crate::lifecycle::DonationTarget {
                ngo_id: "ngo2".into(),
                wishlist_item_id: None,
            }),
        };
        let donation_id = submit_donation(&mut state, request, &config(), &mut Effects::default())
            .unwrap()
            .donation_id;

        let err = claim_donation(&mut state, &donation_id, details(), &mut Effects::default()).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyClaimed(_)));
    }
}
