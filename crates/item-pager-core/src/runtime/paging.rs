// crates/item-pager-core/src/runtime/paging.rs
// ============================================================================
// Module: Page Windowing
// Description: Fixed-size, zero-based page selection over a lazy scan.
// Purpose: Resolve one page while retaining at most one page of records.
// Dependencies: crate::{core, interfaces, runtime::scan}
// ============================================================================

//! ## Overview
//! Pages are windows of `page_size` consecutive records in scan order. The
//! window draws records only until the requested page is complete and keeps
//! a single page-sized buffer, discarding earlier pages as it goes.
//!
//! A trailing page shorter than `page_size` is never returned: with five
//! records and a page size of two, page 2 is empty. Callers relying on the
//! last partial page will not see it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::Record;
use crate::interfaces::ItemStore;
use crate::interfaces::StoreError;
use crate::runtime::scan::ScanIterator;
use crate::runtime::store::DEFAULT_SCAN_BATCH_SIZE;

// ============================================================================
// SECTION: Page Request
// ============================================================================

/// Zero-based page request.
///
/// # Invariants
/// - `page_size <= 0` always resolves to an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u64,
    /// Records per page; non-positive sizes yield empty pages.
    pub page_size: i64,
}

impl PageRequest {
    /// Creates a zero-based page request.
    #[must_use]
    pub const fn new(page: u64, page_size: i64) -> Self {
        Self {
            page,
            page_size,
        }
    }

    /// Translates a user-facing 1-based page number. Returns `None` for page
    /// numbers below 1, which address no page.
    #[must_use]
    pub fn from_page_number(page_number: i64, page_size: i64) -> Option<Self> {
        let page = u64::try_from(page_number.checked_sub(1)?).ok()?;
        Some(Self::new(page, page_size))
    }

    /// Returns the page size as a count when it is positive.
    #[must_use]
    pub fn effective_size(&self) -> Option<usize> {
        usize::try_from(self.page_size).ok().filter(|size| *size > 0)
    }
}

// ============================================================================
// SECTION: Windowing
// ============================================================================

/// Returns the records of the requested page from a fresh scan of `store`.
///
/// No scan is issued for non-positive page sizes.
///
/// # Errors
///
/// Returns [`StoreError`] when a bulk read fails before the page resolves.
pub fn get_page<S: ItemStore + ?Sized>(
    store: &S,
    request: PageRequest,
) -> Result<Vec<Record>, StoreError> {
    let Some(page_size) = request.effective_size() else {
        return Ok(Vec::new());
    };
    window_page(ScanIterator::new(store), request.page, page_size)
}

/// Selects page `page` of `page_size` records from an ordered sequence.
///
/// Stops drawing from `records` as soon as the target page is complete.
///
/// # Errors
///
/// Propagates the first error yielded by `records`.
pub fn window_page<I>(records: I, page: u64, page_size: usize) -> Result<Vec<Record>, StoreError>
where
    I: IntoIterator<Item = Result<Record, StoreError>>,
{
    if page_size == 0 {
        return Ok(Vec::new());
    }
    // Page sizes come from clients; reserve at most one scan batch up front.
    let mut buffer = Vec::with_capacity(page_size.min(DEFAULT_SCAN_BATCH_SIZE));
    let mut num = 0usize;
    let mut current_page = 0u64;
    let mut complete = false;
    for record in records {
        buffer.push(record?);
        num += 1;
        if num == page_size {
            if current_page == page {
                complete = true;
                break;
            }
            num = 0;
            buffer.clear();
            current_page += 1;
        }
    }
    // Short trailing pages are suppressed.
    if !complete {
        buffer.clear();
    }
    Ok(buffer)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::PageRequest;

    #[test]
    fn page_numbers_are_one_based() {
        assert_eq!(PageRequest::from_page_number(1, 5), Some(PageRequest::new(0, 5)));
        assert_eq!(PageRequest::from_page_number(4, 2), Some(PageRequest::new(3, 2)));
        assert_eq!(PageRequest::from_page_number(0, 5), None);
        assert_eq!(PageRequest::from_page_number(-3, 5), None);
        assert_eq!(PageRequest::from_page_number(i64::MIN, 5), None);
    }

    #[test]
    fn effective_size_rejects_non_positive() {
        assert_eq!(PageRequest::new(0, 0).effective_size(), None);
        assert_eq!(PageRequest::new(0, -4).effective_size(), None);
        assert_eq!(PageRequest::new(0, 3).effective_size(), Some(3));
    }
}
