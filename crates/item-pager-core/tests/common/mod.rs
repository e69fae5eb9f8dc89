// crates/item-pager-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared stores and record builders for core tests.
// Purpose: Observe scan traffic and inject store failures deterministically.
// Dependencies: item-pager-core, serde_json
// ============================================================================

//! ## Overview
//! Fixtures wrap the in-memory store to count bulk reads and to fail scans or
//! puts on demand.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use item_pager_core::InMemoryItemStore;
use item_pager_core::ItemStore;
use item_pager_core::PutError;
use item_pager_core::Record;
use item_pager_core::ScanBatch;
use item_pager_core::ScanCursor;
use item_pager_core::StoreError;
use serde_json::json;

/// Builds a record with the given title and a derived description.
pub fn record(title: &str) -> Record {
    Record::from_value(json!({"title": title, "description": format!("about {title}")})).unwrap()
}

/// Builds an in-memory store holding `titles` in order.
pub fn store_with<T: AsRef<str>>(titles: &[T], batch_size: usize) -> InMemoryItemStore {
    let store = InMemoryItemStore::with_batch_size(batch_size);
    for title in titles {
        store.put_if_absent(&record(title.as_ref())).unwrap();
    }
    store
}

/// Builds titles `item-000`, `item-001`, ... for `count` records.
pub fn numbered_titles(count: usize) -> Vec<String> {
    (0 .. count).map(|index| format!("item-{index:03}")).collect()
}

/// Returns the titles of the given records.
pub fn titles(records: &[Record]) -> Vec<String> {
    records.iter().map(|record| record.title().to_string()).collect()
}

/// Store wrapper that counts scans and can fail on a chosen scan call.
pub struct ObservedStore {
    /// Wrapped store.
    pub inner: InMemoryItemStore,
    /// Number of scan calls issued.
    pub scans: AtomicUsize,
    /// 1-based scan call that fails, when set.
    pub fail_scan_at: Option<usize>,
    /// Error returned by the next put, when set.
    pub put_failure: Mutex<Option<StoreError>>,
}

impl ObservedStore {
    /// Wraps a store without failure injection.
    pub fn new(inner: InMemoryItemStore) -> Self {
        Self {
            inner,
            scans: AtomicUsize::new(0),
            fail_scan_at: None,
            put_failure: Mutex::new(None),
        }
    }

    /// Returns the number of scan calls issued so far.
    pub fn scan_calls(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl ItemStore for ObservedStore {
    fn scan(&self, cursor: Option<&ScanCursor>) -> Result<ScanBatch, StoreError> {
        let call = self.scans.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_scan_at == Some(call) {
            return Err(StoreError::Io(format!("scan {call} failed")));
        }
        self.inner.scan(cursor)
    }

    fn put_if_absent(&self, record: &Record) -> Result<(), PutError> {
        if let Some(err) = self.put_failure.lock().unwrap().take() {
            return Err(PutError::Store(err));
        }
        self.inner.put_if_absent(record)
    }
}

/// Store serving fixed batches, used to model arbitrary batch shapes.
pub struct ScriptedStore {
    /// Batches returned in order; cursors are batch indexes.
    pub batches: Vec<Vec<Record>>,
}

impl ItemStore for ScriptedStore {
    fn scan(&self, cursor: Option<&ScanCursor>) -> Result<ScanBatch, StoreError> {
        let index = cursor.map_or(0, |cursor| cursor.as_str().parse::<usize>().unwrap());
        let records = self.batches.get(index).cloned().unwrap_or_default();
        let next_cursor =
            (index + 1 < self.batches.len()).then(|| ScanCursor::new((index + 1).to_string()));
        Ok(ScanBatch {
            records,
            next_cursor,
        })
    }

    fn put_if_absent(&self, _record: &Record) -> Result<(), PutError> {
        Err(PutError::Store(StoreError::Store("scripted store is read-only".to_string())))
    }
}
