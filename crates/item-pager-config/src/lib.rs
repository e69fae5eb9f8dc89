// crates/item-pager-config/src/lib.rs
// ============================================================================
// Module: Item Pager Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for item-pager.toml semantics.
// Dependencies: item-pager-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `item-pager-config` defines the configuration model for the item pager
//! service. Configuration is read once from TOML, adjusted by a small set of
//! environment overrides, and validated fail-closed before anything starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
