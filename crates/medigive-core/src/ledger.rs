//! Append-only, hash-chained log of status transitions.
//!
//! Each entry commits to its predecessor: `hash = sha256(prev_hash || body)`
//! where body is the entry's JSON without the hash. Donations and claims are
//! never deleted, and neither are their transitions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::DonationStatus;

/// Hash preceding the first entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chain broken at entry {seq}: {reason}")]
    Broken { seq: u64, reason: String },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// What kind of record changed status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Donation,
    Claim,
}

/// What caused a transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    Submitted,
    Claimed,
    PassiveProgression,
    FastTrack,
}

/// One committed transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub seq: u64,
    pub subject: Subject,
    pub subject_id: String,
    /// `None` when the record was created
    pub from: Option<DonationStatus>,
    pub to: DonationStatus,
    pub cause: Cause,
    pub at: String,
    pub prev_hash: String,
    pub hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryBody<'a> {
    seq: u64,
    subject: Subject,
    subject_id: &'a str,
    from: Option<DonationStatus>,
    to: DonationStatus,
    cause: Cause,
    at: &'a str,
}

impl LedgerEntry {
    fn compute_hash(&self) -> LedgerResult<String> {
        let body = serde_json::to_string(&EntryBody {
            seq: self.seq,
            subject: self.subject,
            subject_id: &self.subject_id,
            from: self.from,
            to: self.to,
            cause: self.cause,
            at: &self.at,
        })?;
        let mut data = Vec::with_capacity(self.prev_hash.len() + body.len());
        data.extend_from_slice(self.prev_hash.as_bytes());
        data.extend_from_slice(body.as_bytes());
        Ok(hash_data(&data))
    }
}

/// The transition log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition and return the committed entry.
    pub fn append(
        &mut self,
        subject: Subject,
        subject_id: &str,
        from: Option<DonationStatus>,
        to: DonationStatus,
        cause: Cause,
    ) -> LedgerResult<&LedgerEntry> {
        let mut entry = LedgerEntry {
            seq: self.entries.len() as u64,
            subject,
            subject_id: subject_id.to_string(),
            from,
            to,
            cause,
            at: chrono::Utc::now().to_rfc3339(),
            prev_hash: self.head_hash().to_string(),
            hash: String::new(),
        };
        entry.hash = entry.compute_hash()?;
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Hash of the newest entry, or the genesis hash when empty.
    pub fn head_hash(&self) -> &str {
        self.entries
            .last()
            .map(|e| e.hash.as_str())
            .unwrap_or(GENESIS_HASH)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Transitions recorded for one donation or claim, oldest first.
    pub fn history_of<'a>(&'a self, subject_id: &'a str) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
        self.entries.iter().filter(move |e| e.subject_id == subject_id)
    }

    /// Recompute the whole chain.
    pub fn verify(&self) -> LedgerResult<()> {
        let mut prev = GENESIS_HASH;
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.seq != idx as u64 {
                return Err(LedgerError::Broken {
                    seq: entry.seq,
                    reason: format!("expected sequence {}", idx),
                });
            }
            if entry.prev_hash != prev {
                return Err(LedgerError::Broken {
                    seq: entry.seq,
                    reason: "previous hash mismatch".into(),
                });
            }
            if entry.compute_hash()? != entry.hash {
                return Err(LedgerError::Broken {
                    seq: entry.seq,
                    reason: "content hash mismatch".into(),
                });
            }
            prev = &entry.hash;
        }
        Ok(())
    }
}

/// Hash data using SHA-256, hex-encoded.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
