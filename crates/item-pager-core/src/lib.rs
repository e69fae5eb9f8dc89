// crates/item-pager-core/src/lib.rs
// ============================================================================
// Module: Item Pager Core Library
// Description: Public API surface for the Item Pager core.
// Purpose: Expose record types, store interfaces, and pagination runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Item Pager core turns a cursor-linked table scan into fixed-size,
//! page-indexed result sets and performs insert-if-absent writes keyed by
//! record title. It is backend-agnostic: stores plug in through
//! [`ItemStore`], and hosts supply timestamps explicitly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ItemStore;
pub use interfaces::PutError;
pub use interfaces::ScanBatch;
pub use interfaces::ScanCursor;
pub use interfaces::StoreError;
pub use runtime::ConditionalWriter;
pub use runtime::DEFAULT_SCAN_BATCH_SIZE;
pub use runtime::InMemoryItemStore;
pub use runtime::PageRequest;
pub use runtime::RejectionCause;
pub use runtime::ScanIterator;
pub use runtime::SharedItemStore;
pub use runtime::WriteError;
pub use runtime::WriteOutcome;
pub use runtime::get_page;
pub use runtime::window_page;
