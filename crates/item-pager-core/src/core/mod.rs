// crates/item-pager-core/src/core/mod.rs
// ============================================================================
// Module: Item Pager Core Types
// Description: Canonical record model and timestamp helpers.
// Purpose: Provide stable, serializable types shared by stores and the API.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types define the record model persisted by stores and returned by
//! the paginated read path. These types are the canonical source of truth
//! for the HTTP and CLI surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod record;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use record::CREATED_FIELD;
pub use record::DESCRIPTION_FIELD;
pub use record::Record;
pub use record::RecordError;
pub use record::TITLE_FIELD;
pub use time::CreatedAt;
pub use time::TimestampError;
