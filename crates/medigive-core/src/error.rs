//! Core error type.

use medigive_vision::ExtractionError;
use thiserror::Error;

use crate::db::DbError;
use crate::ledger::LedgerError;
use crate::models::DonationStatus;

/// Errors surfaced by core operations.
///
/// Collaborator failures (extraction, camera, storage) always occur before a
/// transition is committed, so they never leave state half-applied.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Donation {0} has already been claimed")]
    AlreadyClaimed(String),

    #[error("Invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: DonationStatus,
        to: DonationStatus,
    },

    #[error("Could not extract medicine details: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Camera access failed: {0}")]
    CameraAccess(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl<T> From<std::sync::PoisonError<T>> for CoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        CoreError::Lock(e.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
