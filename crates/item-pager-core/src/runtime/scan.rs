// crates/item-pager-core/src/runtime/scan.rs
// ============================================================================
// Module: Scan Iterator
// Description: Lazy record sequence over a cursor-linked store scan.
// Purpose: Hide continuation cursors from consumers that may stop early.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`ScanIterator`] issues one bulk read per drained batch and follows the
//! store's continuation cursor until a batch arrives without one. Reads
//! happen only on demand, so a consumer that stops early never causes the
//! next batch to be fetched. A store failure is yielded once, after which the
//! iterator is exhausted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::iter::FusedIterator;
use std::vec;

use crate::core::Record;
use crate::interfaces::ItemStore;
use crate::interfaces::ScanCursor;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Scan Iterator
// ============================================================================

/// Position of the iterator within the store's cursor protocol.
#[derive(Debug)]
enum ScanState {
    /// No bulk read issued yet.
    Start,
    /// More batches remain after the current one.
    Continue(ScanCursor),
    /// The last batch has been fetched, or a read failed.
    Done,
}

/// Lazy sequence of records from one full-table scan.
///
/// # Invariants
/// - Each iterator starts a fresh scan; it cannot resume another scan.
/// - At most one batch is buffered at a time.
pub struct ScanIterator<'a, S: ItemStore + ?Sized> {
    /// Store being scanned.
    store: &'a S,
    /// Unconsumed records from the most recent batch.
    batch: vec::IntoIter<Record>,
    /// Cursor protocol state.
    state: ScanState,
    /// Number of bulk reads issued so far.
    reads: usize,
}

impl<'a, S: ItemStore + ?Sized> ScanIterator<'a, S> {
    /// Starts a new scan over the store. No read is issued until the first
    /// call to `next`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            batch: Vec::new().into_iter(),
            state: ScanState::Start,
            reads: 0,
        }
    }

    /// Returns the number of bulk reads issued so far.
    #[must_use]
    pub const fn reads(&self) -> usize {
        self.reads
    }

    /// Issues the next bulk read and installs its batch.
    fn fetch(&mut self, cursor: Option<&ScanCursor>) -> Result<(), StoreError> {
        self.reads += 1;
        let batch = self.store.scan(cursor)?;
        self.state = batch.next_cursor.map_or(ScanState::Done, ScanState::Continue);
        self.batch = batch.records.into_iter();
        Ok(())
    }
}

impl<S: ItemStore + ?Sized> Iterator for ScanIterator<'_, S> {
    type Item = Result<Record, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.batch.next() {
                return Some(Ok(record));
            }
            let result = match std::mem::replace(&mut self.state, ScanState::Done) {
                ScanState::Done => return None,
                ScanState::Start => self.fetch(None),
                ScanState::Continue(cursor) => self.fetch(Some(&cursor)),
            };
            if let Err(err) = result {
                self.state = ScanState::Done;
                return Some(Err(err));
            }
        }
    }
}

impl<S: ItemStore + ?Sized> FusedIterator for ScanIterator<'_, S> {}
