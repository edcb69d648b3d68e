//! Typed dataset load/save operations.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, DbResult};

const UPSERT_DATASET: &str = r#"
    INSERT INTO datasets (key, value, updated_at)
    VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

/// Logical datasets persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dataset {
    Donations,
    Claims,
    Ngos,
    History,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Donations,
        Dataset::Claims,
        Dataset::Ngos,
        Dataset::History,
    ];

    /// Storage key.
    pub fn key(self) -> &'static str {
        match self {
            Dataset::Donations => "donations",
            Dataset::Claims => "claims",
            Dataset::Ngos => "ngos",
            Dataset::History => "history",
        }
    }
}

impl Database {
    /// Load a dataset, or `None` if it has never been saved.
    pub fn load_dataset<T: DeserializeOwned>(&self, dataset: Dataset) -> DbResult<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM datasets WHERE key = ?",
                [dataset.key()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw
            .map(|json| serde_json::from_str::<T>(&json))
            .transpose()?)
    }

    /// Fully rewrite a dataset.
    pub fn save_dataset<T: Serialize + ?Sized>(&self, dataset: Dataset, value: &T) -> DbResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(UPSERT_DATASET, params![dataset.key(), json])?;
        Ok(())
    }

    /// Rewrite several pre-serialized datasets atomically.
    pub fn save_batch(&mut self, batch: &[(Dataset, String)]) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        for (dataset, json) in batch {
            tx.execute(UPSERT_DATASET, params![dataset.key(), json])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Check whether a dataset has ever been saved.
    pub fn has_dataset(&self, dataset: Dataset) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM datasets WHERE key = ?",
            [dataset.key()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
