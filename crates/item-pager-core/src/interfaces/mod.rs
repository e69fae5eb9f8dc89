// crates/item-pager-core/src/interfaces/mod.rs
// ============================================================================
// Module: Item Pager Interfaces
// Description: Backend-agnostic store interface for scans and conditional puts.
// Purpose: Define the contract that persistence backends must satisfy.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Stores expose two capabilities: a cursor-linked bulk scan and an atomic
//! insert-if-absent keyed by record title. Batch sizes are a store concern;
//! callers must follow cursors until none is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Record;

// ============================================================================
// SECTION: Scan Types
// ============================================================================

/// Opaque continuation token returned by a store scan.
///
/// # Invariants
/// - Only meaningful to the store that produced it, within one full scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanCursor(String);

impl ScanCursor {
    /// Wraps a store-specific cursor payload.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the cursor payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One bulk-read response from a store scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanBatch {
    /// Records in store scan order. May be empty even when more follow.
    pub records: Vec<Record>,
    /// Cursor for the next bulk read; `None` when the scan is exhausted.
    pub next_cursor: Option<ScanCursor>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("item store io error: {0}")]
    Io(String),
    /// Store data is corrupted.
    #[error("item store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("item store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data or request is invalid (including unknown cursors).
    #[error("item store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("item store error: {0}")]
    Store(String),
}

/// Conditional insert errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PutError {
    /// A record with the same title already exists.
    #[error("record with title {title:?} already exists")]
    Conflict {
        /// Conflicting title.
        title: String,
    },
    /// Any other store failure during the conditional insert.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Item Store
// ============================================================================

/// Persistence backend for items.
pub trait ItemStore {
    /// Reads one batch of records, resuming after `cursor` when provided.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails or the cursor is invalid.
    fn scan(&self, cursor: Option<&ScanCursor>) -> Result<ScanBatch, StoreError>;

    /// Inserts the record only if no record with the same title exists.
    ///
    /// # Errors
    ///
    /// Returns [`PutError::Conflict`] when the title is taken and
    /// [`PutError::Store`] for any other failure.
    fn put_if_absent(&self, record: &Record) -> Result<(), PutError>;
}

impl<T: ItemStore + ?Sized> ItemStore for &T {
    fn scan(&self, cursor: Option<&ScanCursor>) -> Result<ScanBatch, StoreError> {
        (**self).scan(cursor)
    }

    fn put_if_absent(&self, record: &Record) -> Result<(), PutError> {
        (**self).put_if_absent(record)
    }
}
