//! MediGive Core Library
//!
//! Matching and lifecycle engine for donating surplus sealed medicine to
//! verified clinics.
//!
//! # Architecture
//!
//! ```text
//! Package photo → Extraction service → MedicineRecord
//!                                           │
//!                     ┌─────────────────────┴─────────────────────┐
//!                     │ untargeted                       targeted │
//!                     ▼                                           ▼
//!            Donation (Uploaded)                    Donation + Claim (Accepted)
//!              open marketplace                              │
//!                     │ clinic claims                        │
//!                     ▼                                      │
//!          Donation + Claim (Accepted) ◄─────────────────────┘
//!                     │        │
//!                     │        └──► Wishlist reconciliation
//!                     ▼
//!      Passive ticker / live tracking → Picked Up → Delivered
//! ```
//!
//! Every status change is appended to a hash-chained transition ledger, so
//! delivery history can be verified end to end.
//!
//! # Modules
//!
//! - [`models`]: Domain types (MedicineRecord, Donation, Claim, Ngo, etc.)
//! - [`matcher`]: Fuzzy name matching and wishlist reconciliation
//! - [`lifecycle`]: Donation/claim state machine transitions
//! - [`ledger`]: Append-only transition history
//! - [`engine`]: Single-writer application state with persistence
//! - [`drivers`]: Passive ticker and live delivery tracking
//! - [`notify`]: Self-expiring user notifications
//! - [`db`]: SQLite key-value dataset store

pub mod config;
pub mod db;
pub mod drivers;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod matcher;
pub mod models;
pub mod notify;
pub mod state;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use config::EngineConfig;
pub use db::Database;
pub use drivers::{FastTrack, PassiveTicker, TrackOutcome, TrackProgress, TrackStage};
pub use engine::{ClaimSummary, Engine, Tracking};
pub use error::{CoreError, CoreResult};
pub use ledger::{Ledger, LedgerEntry};
pub use lifecycle::{ClaimOutcome, DonationTarget, SubmitRequest, Submission};
pub use matcher::{matches, reconcile, RequirementMet};
pub use models::{
    Claim, ClaimDetails, Donation, DonationStatus, MedicineRecord, Ngo, Notification,
    NotificationKind, Urgency, WishlistItem,
};
pub use notify::Notifier;
pub use state::AppState;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MediGiveError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("Camera access error: {0}")]
    CameraAccessError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<CoreError> for MediGiveError {
    fn from(e: CoreError) -> Self {
        let message = e.to_string();
        match e {
            CoreError::Database(_) | CoreError::Ledger(_) => MediGiveError::DatabaseError(message),
            CoreError::NotFound(what) => MediGiveError::NotFound(what),
            CoreError::InvalidInput(reason) => MediGiveError::InvalidInput(reason),
            CoreError::Validation(reason) => MediGiveError::ValidationError(reason),
            CoreError::AlreadyClaimed(id) => MediGiveError::AlreadyClaimed(id),
            CoreError::Extraction(e) => MediGiveError::ExtractionError(e.to_string()),
            CoreError::CameraAccess(reason) => MediGiveError::CameraAccessError(reason),
            CoreError::InvalidTransition { .. }
            | CoreError::Config(_)
            | CoreError::Runtime(_)
            | CoreError::Lock(_) => MediGiveError::InternalError(message),
        }
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store at the given path.
#[uniffi::export]
pub fn open_core(path: String) -> Result<Arc<MediGiveCore>, MediGiveError> {
    let config = EngineConfig {
        database_path: Some(path.into()),
        ..EngineConfig::default()
    };
    MediGiveCore::open(config)
}

/// Open a store described by a JSON config file.
#[uniffi::export]
pub fn open_core_with_config(config_path: String) -> Result<Arc<MediGiveCore>, MediGiveError> {
    MediGiveCore::open(EngineConfig::load(config_path)?)
}

/// Create an in-memory store (for testing).
#[uniffi::export]
pub fn open_core_in_memory() -> Result<Arc<MediGiveCore>, MediGiveError> {
    MediGiveCore::open(EngineConfig::default())
}

/// Prompt for the extraction service, dated today.
#[uniffi::export]
pub fn analysis_prompt() -> String {
    medigive_vision::make_analysis_prompt(chrono::Local::now().date_naive())
}

/// Stage label for a live-tracking progress percentage.
#[uniffi::export]
pub fn tracking_stage_label(percent: f64) -> String {
    drivers::stage_for(percent).label().to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe engine wrapper for FFI.
///
/// Hosts without a tokio runtime drive progression themselves by calling
/// [`MediGiveCore::tick_passive`] on their own timer and
/// [`MediGiveCore::complete_delivery`] when their tracking animation ends.
#[derive(uniffi::Object)]
pub struct MediGiveCore {
    engine: Arc<Engine>,
}

impl MediGiveCore {
    fn open(config: EngineConfig) -> Result<Arc<Self>, MediGiveError> {
        let engine = Engine::open(config)?;
        Ok(Arc::new(Self {
            engine: Arc::new(engine),
        }))
    }
}

#[uniffi::export]
impl MediGiveCore {
    // =========================================================================
    // Scanning
    // =========================================================================

    /// Validate a raw extraction-service response into a medicine record.
    pub fn record_from_analysis(
        &self,
        response: String,
        image_ref: Option<String>,
    ) -> Result<FfiMedicineRecord, MediGiveError> {
        let today = chrono::Local::now().date_naive();
        let analysis = medigive_vision::parse_analysis(&response, today).map_err(CoreError::from)?;
        Ok(MedicineRecord::from_analysis(analysis, image_ref).into())
    }

    // =========================================================================
    // Donation Operations
    // =========================================================================

    /// Submit a scanned medicine, optionally aimed at a clinic and need.
    pub fn submit_donation(
        &self,
        medicine: FfiMedicineRecord,
        address: String,
        target_ngo_id: Option<String>,
        target_wishlist_item_id: Option<String>,
    ) -> Result<FfiSubmission, MediGiveError> {
        let target = target_ngo_id.map(|ngo_id| DonationTarget {
            ngo_id,
            wishlist_item_id: target_wishlist_item_id,
        });
        let submission = self.engine.submit_donation(SubmitRequest {
            medicine: medicine.into(),
            address,
            target,
        })?;
        Ok(submission.into())
    }

    /// Claim a marketplace donation for a clinic. Returns the claim ID.
    pub fn claim_donation(
        &self,
        donation_id: String,
        ngo_id: String,
        ngo_name: String,
        shipping_address: String,
        payment_method: String,
    ) -> Result<String, MediGiveError> {
        let details = ClaimDetails {
            ngo_id,
            ngo_name,
            shipping_address,
            payment_method,
        };
        let outcome = self.engine.claim_donation(&donation_id, details)?;
        Ok(outcome.claim_id)
    }

    /// Unclaimed donations, newest first.
    pub fn get_marketplace(&self) -> Result<Vec<FfiDonation>, MediGiveError> {
        let donations = self.engine.marketplace()?;
        Ok(donations.into_iter().map(|d| d.into()).collect())
    }

    /// A donor's donations, newest first.
    pub fn get_donor_donations(&self, donor_id: String) -> Result<Vec<FfiDonation>, MediGiveError> {
        let donations = self.engine.donations_for_donor(&donor_id)?;
        Ok(donations.into_iter().map(|d| d.into()).collect())
    }

    // =========================================================================
    // Claim Operations
    // =========================================================================

    /// Claims received by a clinic, newest first.
    pub fn get_ngo_claims(&self, ngo_name: String) -> Result<Vec<FfiClaim>, MediGiveError> {
        let claims = self.engine.claims_for_ngo(&ngo_name)?;
        Ok(claims.into_iter().map(|c| c.into()).collect())
    }

    pub fn get_claim_for_donation(&self, donation_id: String) -> Result<Option<FfiClaim>, MediGiveError> {
        let claim = self.engine.claim_for_donation(&donation_id)?;
        Ok(claim.map(|c| c.into()))
    }

    /// Claims still in delivery, across all clinics.
    pub fn get_active_claims(&self) -> Result<Vec<FfiClaim>, MediGiveError> {
        let claims = self.engine.active_claims()?;
        Ok(claims.into_iter().map(|c| c.into()).collect())
    }

    /// Advance every undelivered claim one step. Returns how many moved.
    pub fn tick_passive(&self) -> Result<u32, MediGiveError> {
        let advanced = self.engine.advance_passive()?;
        Ok(advanced as u32)
    }

    /// Finish a tracked delivery. Returns `false` if it was already delivered.
    pub fn complete_delivery(&self, claim_id: String) -> Result<bool, MediGiveError> {
        Ok(self.engine.complete_fast_track(&claim_id)?)
    }

    /// Recompute the transition ledger's hash chain.
    pub fn verify_history(&self) -> Result<(), MediGiveError> {
        Ok(self.engine.verify_ledger()?)
    }

    // =========================================================================
    // Clinic Operations
    // =========================================================================

    pub fn get_ngos(&self) -> Result<Vec<FfiNgo>, MediGiveError> {
        let ngos = self.engine.ngos()?;
        Ok(ngos.into_iter().map(|n| n.into()).collect())
    }

    /// Clinics with an open need for a scanned medicine, most urgent first.
    pub fn get_clinics_needing(&self, medicine_name: String) -> Result<Vec<FfiNgo>, MediGiveError> {
        let ngos = self.engine.clinics_needing(&medicine_name)?;
        Ok(ngos.into_iter().map(|n| n.into()).collect())
    }

    /// Add a need to a clinic's wishlist. Returns the item ID.
    pub fn add_wishlist_item(
        &self,
        ngo_id: String,
        medicine_name: String,
        quantity_needed: u32,
        urgency: String,
    ) -> Result<String, MediGiveError> {
        let urgency: Urgency = urgency.parse().map_err(MediGiveError::InvalidInput)?;
        Ok(self
            .engine
            .add_wishlist_item(&ngo_id, &medicine_name, quantity_needed, urgency)?)
    }

    pub fn remove_wishlist_item(&self, ngo_id: String, item_id: String) -> Result<bool, MediGiveError> {
        Ok(self.engine.remove_wishlist_item(&ngo_id, &item_id)?)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Live notifications, oldest first.
    pub fn get_notifications(&self) -> Vec<FfiNotification> {
        self.engine
            .notifications()
            .into_iter()
            .map(|n| n.into())
            .collect()
    }

    pub fn dismiss_notification(&self, id: String) -> bool {
        self.engine.dismiss_notification(&id)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe medicine record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicineRecord {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub manufacturer: String,
    pub expiry_date: String,
    pub is_sealed: bool,
    pub is_unexpired: bool,
    pub confidence: f64,
    pub image_ref: Option<String>,
}

impl From<MedicineRecord> for FfiMedicineRecord {
    fn from(record: MedicineRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            dosage: record.dosage,
            manufacturer: record.manufacturer,
            expiry_date: record.expiry_date,
            is_sealed: record.is_sealed,
            is_unexpired: record.is_unexpired,
            confidence: record.confidence,
            image_ref: record.image_ref,
        }
    }
}

impl From<FfiMedicineRecord> for MedicineRecord {
    fn from(record: FfiMedicineRecord) -> Self {
        MedicineRecord {
            id: record.id,
            name: record.name,
            dosage: record.dosage,
            manufacturer: record.manufacturer,
            expiry_date: record.expiry_date,
            is_sealed: record.is_sealed,
            is_unexpired: record.is_unexpired,
            confidence: record.confidence,
            image_ref: record.image_ref,
        }
    }
}

/// FFI-safe donation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDonation {
    pub id: String,
    pub donor_id: String,
    pub medicine: FfiMedicineRecord,
    pub status: String,
    pub timestamp: String,
    pub address: String,
    pub ngo_id: Option<String>,
    pub ngo_name: Option<String>,
}

impl From<Donation> for FfiDonation {
    fn from(donation: Donation) -> Self {
        Self {
            id: donation.id,
            donor_id: donation.donor_id,
            medicine: donation.medicine.into(),
            status: donation.status.label().to_string(),
            timestamp: donation.timestamp,
            address: donation.address,
            ngo_id: donation.ngo_id,
            ngo_name: donation.ngo_name,
        }
    }
}

/// FFI-safe claim.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClaim {
    pub id: String,
    pub donation_id: String,
    pub ngo_name: String,
    pub shipping_address: String,
    pub payment_method: String,
    pub status: String,
    pub timestamp: String,
    pub medicine_name: String,
}

impl From<Claim> for FfiClaim {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id,
            donation_id: claim.donation_id,
            ngo_name: claim.ngo_name,
            shipping_address: claim.shipping_address,
            payment_method: claim.payment_method,
            status: claim.status.label().to_string(),
            timestamp: claim.timestamp,
            medicine_name: claim.medicine_name,
        }
    }
}

/// FFI-safe wishlist item.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiWishlistItem {
    pub id: String,
    pub medicine_name: String,
    pub quantity_needed: u32,
    pub quantity_fulfilled: u32,
    pub urgency: String,
    /// Fraction of the target received, `0.0..=1.0`
    pub progress: f64,
}

impl From<WishlistItem> for FfiWishlistItem {
    fn from(item: WishlistItem) -> Self {
        let progress = item.progress();
        Self {
            id: item.id,
            medicine_name: item.medicine_name,
            quantity_needed: item.quantity_needed,
            quantity_fulfilled: item.quantity_fulfilled,
            urgency: item.urgency.label().to_string(),
            progress,
        }
    }
}

/// FFI-safe clinic.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNgo {
    pub id: String,
    pub name: String,
    pub location: String,
    pub verified: bool,
    pub impact_score: f64,
    pub logo: String,
    pub wishlist: Vec<FfiWishlistItem>,
}

impl From<Ngo> for FfiNgo {
    fn from(ngo: Ngo) -> Self {
        Self {
            id: ngo.id,
            name: ngo.name,
            location: ngo.location,
            verified: ngo.verified,
            impact_score: ngo.impact_score,
            logo: ngo.logo,
            wishlist: ngo.wishlist.into_iter().map(|w| w.into()).collect(),
        }
    }
}

/// FFI-safe submission result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmission {
    pub donation_id: String,
    pub claim_id: Option<String>,
    pub mismatch: bool,
    pub requirement_met: Option<String>,
}

impl From<Submission> for FfiSubmission {
    fn from(submission: Submission) -> Self {
        Self {
            donation_id: submission.donation_id,
            claim_id: submission.claim_id,
            mismatch: submission.mismatch,
            requirement_met: submission.requirement_met.map(|e| e.medicine_name),
        }
    }
}

/// FFI-safe notification.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotification {
    pub id: String,
    pub message: String,
    pub kind: String,
}

impl From<Notification> for FfiNotification {
    fn from(notification: Notification) -> Self {
        let kind = match notification.kind {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
        };
        Self {
            id: notification.id,
            message: notification.message,
            kind: kind.to_string(),
        }
    }
}
