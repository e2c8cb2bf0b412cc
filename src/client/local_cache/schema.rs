//! Cache Schema Definitions
//!
//! Contains schema-related constants and utilities.

/// Current cache schema version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Schema migration versions
pub const MIGRATION_VERSIONS: &[i64] = &[1];

pub const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
)";

/// Migration 1: the key-value table mirroring browser-style local storage
pub const CREATE_KV_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

pub const UPSERT_ENTRY: &str = "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

pub const DELETE_ENTRY: &str = "DELETE FROM kv_store WHERE key = ?";

pub const SELECT_ENTRIES: &str = "SELECT key, value FROM kv_store";

/// Check if database needs migration
pub fn needs_migration(current_version: i64) -> bool {
    current_version < CURRENT_SCHEMA_VERSION
}

/// Get pending migrations
pub fn get_pending_migrations(current_version: i64) -> Vec<i64> {
    MIGRATION_VERSIONS
        .iter()
        .filter(|&&v| v > current_version)
        .cloned()
        .collect()
}
