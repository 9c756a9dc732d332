//! SQL schema for the local storage database.
//!
//! Run whenever a store is opened. Later schema changes will be gated on
//! `PRAGMA user_version`.

/// Schema DDL. Safe to run on every open.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per key, mirroring the browser localStorage model.
CREATE TABLE IF NOT EXISTS local_storage (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
