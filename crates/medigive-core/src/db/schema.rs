//! SQLite schema definition.

/// Complete database schema for medigive.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Datasets (one row per logical dataset, value fully rewritten on change)
-- ============================================================================

CREATE TABLE IF NOT EXISTS datasets (
    key TEXT PRIMARY KEY CHECK (key IN ('donations', 'claims', 'ngos', 'history')),
    value TEXT NOT NULL CHECK (json_valid(value)),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
