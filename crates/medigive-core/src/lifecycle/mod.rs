//! Donation/claim state machine.
//!
//! ```text
//!   submit (untargeted)          claim
//!  ─────────────────► Uploaded ─────────► Accepted ─► Picked Up ─► Delivered
//!   submit (targeted) ───────────────────►   ▲            passive / fast track
//! ```
//!
//! Every function here mutates an [`AppState`] in place and records what it
//! touched in [`Effects`]. The engine runs them against a copy of the state and
//! only swaps the copy in once the touched datasets are persisted.

mod claim;
mod progression;
mod submit;
mod wishlist;

pub use claim::*;
pub use progression::*;
pub use submit::*;
pub use wishlist::*;

use std::collections::BTreeSet;

use log::debug;

use crate::db::Dataset;
use crate::error::{CoreError, CoreResult};
use crate::ledger::{Cause, Ledger, Subject};
use crate::models::{DonationStatus, Notice};

/// Side effects of one transition.
#[derive(Debug, Default)]
pub struct Effects {
    /// Datasets that must be rewritten
    pub touched: BTreeSet<Dataset>,
    /// Notices to emit once committed, in order
    pub notices: Vec<Notice>,
}

impl Effects {
    pub fn touch(&mut self, dataset: Dataset) {
        self.touched.insert(dataset);
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Move `status` forward to `to`, logging the step in the ledger.
///
/// Returns `false` when already at `to`. Moving backwards is refused: status
/// history is append-only.
pub(crate) fn advance_status(
    ledger: &mut Ledger,
    subject: Subject,
    id: &str,
    status: &mut DonationStatus,
    to: DonationStatus,
    cause: Cause,
) -> CoreResult<bool> {
    if *status == to {
        return Ok(false);
    }
    if to < *status {
        return Err(CoreError::InvalidTransition {
            id: id.to_string(),
            from: *status,
            to,
        });
    }
    ledger.append(subject, id, Some(*status), to, cause)?;
    debug!("{:?} {}: {} -> {} ({:?})", subject, id, status, to, cause);
    *status = to;
    Ok(true)
}

/// Reject empty or whitespace-only required input.
pub(crate) fn require_non_empty(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}
