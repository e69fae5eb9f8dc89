// crates/item-pager-core/src/runtime/mod.rs
// ============================================================================
// Module: Item Pager Runtime
// Description: Scan iteration, page windowing, conditional writes, stores.
// Purpose: Implement the read and write paths on top of `ItemStore`.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The read path is two layers: [`ScanIterator`] flattens cursor-linked
//! batches into one lazy sequence, and [`get_page`] windows that sequence
//! into a single fixed-size page. The write path is [`ConditionalWriter`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod paging;
pub mod scan;
pub mod store;
pub mod writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use paging::PageRequest;
pub use paging::get_page;
pub use paging::window_page;
pub use scan::ScanIterator;
pub use store::DEFAULT_SCAN_BATCH_SIZE;
pub use store::InMemoryItemStore;
pub use store::SharedItemStore;
pub use writer::ConditionalWriter;
pub use writer::RejectionCause;
pub use writer::WriteError;
pub use writer::WriteOutcome;
