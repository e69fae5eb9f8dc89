// crates/item-pager-core/src/runtime/store.rs
// ============================================================================
// Module: Item Pager In-Memory Store
// Description: Simple in-memory item store and shared store wrapper.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! [`InMemoryItemStore`] keeps records in insertion order and serves scans in
//! fixed-size batches linked by an offset cursor. Like a paged table scan, a
//! full batch always carries a cursor, so the final batch may be empty.
//! Records are append-only, which keeps offsets stable across writes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

use crate::core::Record;
use crate::interfaces::ItemStore;
use crate::interfaces::PutError;
use crate::interfaces::ScanBatch;
use crate::interfaces::ScanCursor;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Default number of records returned per scan batch.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 100;

/// Cursor payload for in-memory scans.
#[derive(Debug, Serialize, Deserialize)]
struct MemoryCursor {
    /// Offset of the first record in the next batch.
    offset: usize,
}

/// Table contents guarded by a single lock.
#[derive(Debug, Default)]
struct Table {
    /// Records in insertion order.
    records: Vec<Record>,
    /// Titles present in `records`.
    titles: HashSet<String>,
}

/// In-memory item store for tests, demos, and single-process deployments.
#[derive(Debug, Clone)]
pub struct InMemoryItemStore {
    /// Table protected by a mutex.
    table: Arc<Mutex<Table>>,
    /// Maximum records returned per scan batch.
    batch_size: usize,
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryItemStore {
    /// Creates an empty store with the default batch size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_batch_size(DEFAULT_SCAN_BATCH_SIZE)
    }

    /// Creates an empty store returning at most `batch_size` records per
    /// scan batch. A zero batch size is treated as one.
    #[must_use]
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table::default())),
            batch_size: batch_size.max(1),
        }
    }

    /// Returns the configured batch size.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        let guard = self
            .table
            .lock()
            .map_err(|_| StoreError::Store("item store mutex poisoned".to_string()))?;
        Ok(guard.records.len())
    }

    /// Returns true when the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|len| len == 0)
    }
}

impl ItemStore for InMemoryItemStore {
    fn scan(&self, cursor: Option<&ScanCursor>) -> Result<ScanBatch, StoreError> {
        let start = match cursor {
            None => 0,
            Some(cursor) => {
                let MemoryCursor {
                    offset,
                } = serde_json::from_str(cursor.as_str())
                    .map_err(|_| StoreError::Invalid("invalid cursor".to_string()))?;
                offset
            }
        };
        let guard = self
            .table
            .lock()
            .map_err(|_| StoreError::Store("item store mutex poisoned".to_string()))?;
        if start > guard.records.len() {
            return Err(StoreError::Invalid("cursor beyond end of table".to_string()));
        }
        let end = start.saturating_add(self.batch_size).min(guard.records.len());
        let records = guard.records[start .. end].to_vec();
        drop(guard);
        let next_cursor = if records.len() == self.batch_size {
            let token = serde_json::to_string(&MemoryCursor {
                offset: end,
            })
            .map_err(|err| StoreError::Invalid(format!("failed to serialize cursor: {err}")))?;
            Some(ScanCursor::new(token))
        } else {
            None
        };
        Ok(ScanBatch {
            records,
            next_cursor,
        })
    }

    fn put_if_absent(&self, record: &Record) -> Result<(), PutError> {
        let mut guard = self
            .table
            .lock()
            .map_err(|_| StoreError::Store("item store mutex poisoned".to_string()))?;
        if !guard.titles.insert(record.title().to_string()) {
            return Err(PutError::Conflict {
                title: record.title().to_string(),
            });
        }
        guard.records.push(record.clone());
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared item store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedItemStore {
    /// Inner store implementation.
    inner: Arc<dyn ItemStore + Send + Sync>,
}

impl SharedItemStore {
    /// Wraps an item store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl ItemStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn ItemStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl ItemStore for SharedItemStore {
    fn scan(&self, cursor: Option<&ScanCursor>) -> Result<ScanBatch, StoreError> {
        self.inner.scan(cursor)
    }

    fn put_if_absent(&self, record: &Record) -> Result<(), PutError> {
        self.inner.put_if_absent(record)
    }
}
