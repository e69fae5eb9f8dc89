// crates/item-pager-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Item Store
// Description: Durable ItemStore backend using SQLite WAL.
// Purpose: Provide persistent, title-unique item storage with paged scans.
// Dependencies: item-pager-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ItemStore`](item_pager_core::ItemStore)
//! implementation. Records are stored as JSON in insertion order, titles are
//! unique at the schema level, and scans page through rows with an opaque
//! sequence cursor.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_BUSY_TIMEOUT_MS;
pub use store::DEFAULT_SCAN_BATCH_SIZE;
pub use store::MAX_RECORD_BYTES;
pub use store::SqliteItemStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use store::validate_table_name;
