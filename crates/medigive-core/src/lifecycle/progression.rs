//! Delivery progression transitions.

use log::{debug, info};

use crate::db::Dataset;
use crate::error::{CoreError, CoreResult};
use crate::ledger::{Cause, Ledger, Subject};
use crate::models::{Donation, DonationStatus, Notice};
use crate::state::AppState;

use super::{advance_status, Effects};

/// Advance every undelivered claim exactly one rung along
/// `[Accepted, Picked Up, Delivered]`, mirroring each step onto the paired
/// donation. Returns the number of claims advanced.
pub fn advance_passive(state: &mut AppState, fx: &mut Effects) -> CoreResult<usize> {
    let mut advanced = 0;
    let mut donations_changed = false;

    for claim in state.claims.iter_mut() {
        let Some(next) = claim.status.next_delivery_step() else {
            continue;
        };
        advance_status(
            &mut state.ledger,
            Subject::Claim,
            &claim.id,
            &mut claim.status,
            next,
            Cause::PassiveProgression,
        )?;
        advanced += 1;

        donations_changed |= mirror_onto_donation(
            &mut state.ledger,
            &mut state.donations,
            &claim.donation_id,
            next,
            Cause::PassiveProgression,
        )?;
    }

    if advanced > 0 {
        debug!("Passive progression advanced {} claim(s)", advanced);
        fx.touch(Dataset::Claims);
        fx.touch(Dataset::History);
    }
    if donations_changed {
        fx.touch(Dataset::Donations);
    }
    Ok(advanced)
}

/// Finish a live-tracked delivery: claim and paired donation both become
/// `Delivered`. Returns `false` if both were already delivered.
pub fn complete_fast_track(state: &mut AppState, claim_id: &str, fx: &mut Effects) -> CoreResult<bool> {
    let idx = state
        .claim_index(claim_id)
        .ok_or_else(|| CoreError::NotFound(format!("claim {}", claim_id)))?;
    let claim = &mut state.claims[idx];

    let claim_changed = advance_status(
        &mut state.ledger,
        Subject::Claim,
        claim_id,
        &mut claim.status,
        DonationStatus::Delivered,
        Cause::FastTrack,
    )?;
    let donation_changed = mirror_onto_donation(
        &mut state.ledger,
        &mut state.donations,
        &claim.donation_id,
        DonationStatus::Delivered,
        Cause::FastTrack,
    )?;

    if claim_changed {
        info!("Claim {} delivered via live tracking", claim_id);
        fx.touch(Dataset::Claims);
        fx.notify(Notice::success(format!(
            "Delivery verified & completed for {}!",
            claim.ngo_name
        )));
    }
    if donation_changed {
        fx.touch(Dataset::Donations);
    }
    if claim_changed || donation_changed {
        fx.touch(Dataset::History);
    }
    Ok(claim_changed || donation_changed)
}

/// Bring the donation with `donation_id` up to `status` if it lags behind.
fn mirror_onto_donation(
    ledger: &mut Ledger,
    donations: &mut [Donation],
    donation_id: &str,
    status: DonationStatus,
    cause: Cause,
) -> CoreResult<bool> {
    let Some(donation) = donations.iter_mut().find(|d| d.id == donation_id) else {
        return Ok(false);
    };
    if donation.status >= status {
        return Ok(false);
    }
    advance_status(ledger, Subject::Donation, donation_id, &mut donation.status, status, cause)
}
