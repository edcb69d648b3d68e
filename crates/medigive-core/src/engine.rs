//! Single-writer application engine.
//!
//! The engine owns the committed [`AppState`], the database and the
//! notifier. Every mutation runs a lifecycle function against a copy of the
//! state, persists the datasets it touched in one transaction and only then
//! swaps the copy in and emits its notices. A failed write leaves the
//! committed state untouched.

use std::sync::{Arc, Mutex};

use log::{info, warn};
use medigive_vision::MedicineAnalyzer;

use crate::config::EngineConfig;
use crate::db::{Database, Dataset, DbResult};
use crate::drivers::{FastTrack, TrackTiming};
use crate::error::{CoreError, CoreResult};
use crate::ledger::LedgerEntry;
use crate::lifecycle::{self, ClaimOutcome, Effects, SubmitRequest, Submission};
use crate::models::{Claim, ClaimDetails, Donation, DonationStatus, MedicineRecord, Ngo, Notification, Urgency};
use crate::notify::Notifier;
use crate::state::AppState;

/// What opening a claim's tracking view produces.
pub enum Tracking {
    /// The claim is already delivered; no animation is started.
    Summary(ClaimSummary),
    /// A live delivery run for an undelivered claim.
    Live(FastTrack),
}

/// Static record of a completed delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSummary {
    pub claim: Claim,
    pub donation: Option<Donation>,
    /// Ledger entries for the claim, oldest first
    pub steps: Vec<LedgerEntry>,
}

pub struct Engine {
    state: Mutex<AppState>,
    db: Mutex<Database>,
    notifier: Notifier,
    config: EngineConfig,
}

impl Engine {
    /// Open the configured database (in memory when no path is set) and load
    /// every dataset.
    pub fn open(config: EngineConfig) -> CoreResult<Self> {
        config.validate()?;
        let db = match &config.database_path {
            Some(path) => {
                info!("Opening database at {}", path.display());
                Database::open(path)?
            }
            None => Database::open_in_memory()?,
        };
        Self::with_database(db, config)
    }

    /// Build an engine over an already opened database.
    pub fn with_database(db: Database, config: EngineConfig) -> CoreResult<Self> {
        let state = AppState::load(&db)?;
        if !db.has_dataset(Dataset::Ngos)? {
            db.save_dataset(Dataset::Ngos, &state.ngos)?;
        }
        info!(
            "Loaded {} donation(s), {} claim(s), {} clinic(s)",
            state.donations.len(),
            state.claims.len(),
            state.ngos.len()
        );

        Ok(Self {
            state: Mutex::new(state),
            db: Mutex::new(db),
            notifier: Notifier::new(config.notification_ttl()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn submit_donation(&self, request: SubmitRequest) -> CoreResult<Submission> {
        self.commit(|state, fx| lifecycle::submit_donation(state, request, &self.config, fx))
    }

    pub fn claim_donation(&self, donation_id: &str, details: ClaimDetails) -> CoreResult<ClaimOutcome> {
        self.commit(|state, fx| lifecycle::claim_donation(state, donation_id, details, fx))
    }

    pub fn add_wishlist_item(
        &self,
        ngo_id: &str,
        medicine_name: &str,
        quantity_needed: u32,
        urgency: Urgency,
    ) -> CoreResult<String> {
        self.commit(|state, fx| {
            lifecycle::add_wishlist_item(state, ngo_id, medicine_name, quantity_needed, urgency, fx)
        })
    }

    pub fn remove_wishlist_item(&self, ngo_id: &str, item_id: &str) -> CoreResult<bool> {
        self.commit(|state, fx| lifecycle::remove_wishlist_item(state, ngo_id, item_id, fx))
    }

    /// One passive progression tick.
    pub fn advance_passive(&self) -> CoreResult<usize> {
        self.commit(lifecycle::advance_passive)
    }

    /// Mark a claim and its donation delivered.
    pub fn complete_fast_track(&self, claim_id: &str) -> CoreResult<bool> {
        self.commit(|state, fx| lifecycle::complete_fast_track(state, claim_id, fx))
    }

    /// Open tracking for a claim. Delivered claims get their static summary;
    /// anything else starts a live delivery run, which needs a tokio runtime.
    pub fn track(self: &Arc<Self>, claim_id: &str) -> CoreResult<Tracking> {
        let summary = self.read(|state| -> CoreResult<Option<ClaimSummary>> {
            let claim = state
                .claim(claim_id)
                .ok_or_else(|| CoreError::NotFound(format!("claim {}", claim_id)))?;
            if claim.status != DonationStatus::Delivered {
                return Ok(None);
            }
            Ok(Some(ClaimSummary {
                claim: claim.clone(),
                donation: state.donation(&claim.donation_id).cloned(),
                steps: state.ledger.history_of(claim_id).cloned().collect(),
            }))
        })??;

        match summary {
            Some(summary) => Ok(Tracking::Summary(summary)),
            None => {
                let timing = TrackTiming::from_config(&self.config);
                FastTrack::start(Arc::clone(self), claim_id.to_string(), timing).map(Tracking::Live)
            }
        }
    }

    /// Turn a captured image into a medicine record. `capture` carries the
    /// camera's failure message when no image could be taken. Never touches
    /// committed state.
    pub fn scan(
        &self,
        analyzer: &dyn MedicineAnalyzer,
        capture: Result<&[u8], &str>,
        image_ref: Option<String>,
    ) -> CoreResult<MedicineRecord> {
        let image = capture.map_err(|reason| {
            warn!("Camera access failed: {}", reason);
            CoreError::CameraAccess(reason.to_string())
        })?;
        let analysis = analyzer.analyze(image).map_err(|e| {
            warn!("Medicine analysis failed: {}", e);
            CoreError::from(e)
        })?;
        let record = MedicineRecord::from_analysis(analysis, image_ref);
        info!("Scanned {} ({:.0}% confidence)", record.label(), record.confidence * 100.0);
        Ok(record)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Copy of the committed state.
    pub fn snapshot(&self) -> CoreResult<AppState> {
        self.read(AppState::clone)
    }

    pub fn marketplace(&self) -> CoreResult<Vec<Donation>> {
        self.read(|s| s.marketplace().into_iter().cloned().collect())
    }

    pub fn donations_for_donor(&self, donor_id: &str) -> CoreResult<Vec<Donation>> {
        self.read(|s| s.donations_for_donor(donor_id).into_iter().cloned().collect())
    }

    pub fn claims_for_ngo(&self, ngo_name: &str) -> CoreResult<Vec<Claim>> {
        self.read(|s| s.claims_for_ngo(ngo_name).into_iter().cloned().collect())
    }

    pub fn claim_for_donation(&self, donation_id: &str) -> CoreResult<Option<Claim>> {
        self.read(|s| s.claim_for_donation(donation_id).cloned())
    }

    pub fn ngos(&self) -> CoreResult<Vec<Ngo>> {
        self.read(|s| s.ngos.clone())
    }

    /// Clinics that want `medicine_name`, most urgent need first.
    pub fn clinics_needing(&self, medicine_name: &str) -> CoreResult<Vec<Ngo>> {
        self.read(|s| s.clinics_needing(medicine_name).into_iter().cloned().collect())
    }

    /// Claims not yet delivered.
    pub fn active_claims(&self) -> CoreResult<Vec<Claim>> {
        self.read(|s| s.active_claims().into_iter().cloned().collect())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.active()
    }

    pub fn dismiss_notification(&self, id: &str) -> bool {
        self.notifier.dismiss(id)
    }

    /// Check the committed transition ledger end to end.
    pub fn verify_ledger(&self) -> CoreResult<()> {
        self.read(|s| s.ledger.verify())??;
        Ok(())
    }

    /// Run `f` while holding the database lock.
    #[cfg(test)]
    pub(crate) fn with_db_locked<T>(&self, f: impl FnOnce() -> T) -> T {
        let _db = self.db.lock().unwrap();
        f()
    }

    fn read<T>(&self, f: impl FnOnce(&AppState) -> T) -> CoreResult<T> {
        let state = self.state.lock()?;
        Ok(f(&state))
    }

    fn commit<T>(&self, op: impl FnOnce(&mut AppState, &mut Effects) -> CoreResult<T>) -> CoreResult<T> {
        let mut state = self.state.lock()?;
        let mut draft = state.clone();
        let mut fx = Effects::default();
        let out = op(&mut draft, &mut fx)?;

        if !fx.touched.is_empty() {
            let batch = fx
                .touched
                .iter()
                .map(|&dataset| Ok((dataset, encode(&draft, dataset)?)))
                .collect::<DbResult<Vec<_>>>()?;
            self.db.lock()?.save_batch(&batch)?;
        }
        *state = draft;
        drop(state);

        for notice in fx.notices {
            self.notifier.push(notice);
        }
        Ok(out)
    }
}

fn encode(state: &AppState, dataset: Dataset) -> DbResult<String> {
    let json = match dataset {
        Dataset::Donations => serde_json::to_string(&state.donations)?,
        Dataset::Claims => serde_json::to_string(&state.claims)?,
        Dataset::Ngos => serde_json::to_string(&state.ngos)?,
        Dataset::History => serde_json::to_string(&state.ledger)?,
    };
    Ok(json)
}
