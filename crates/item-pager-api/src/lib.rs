// crates/item-pager-api/src/lib.rs
// ============================================================================
// Module: Item Pager API Library
// Description: HTTP surface for the paginated item collection.
// Purpose: Route /items requests to the pager and writer with request logs.
// Dependencies: item-pager-core, item-pager-config, axum, tokio
// ============================================================================

//! ## Overview
//! `item-pager-api` exposes the item collection over HTTP. Requests are
//! translated into transport-neutral [`ItemRequest`] values and resolved by
//! [`dispatch`], which the CLI reuses for offline imports. Every request
//! produces one structured `item_request` log event.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod context;
pub mod dispatch;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ItemAuditEvent;
pub use audit::ItemAuditSink;
pub use audit::ItemFileAuditSink;
pub use audit::ItemLogger;
pub use audit::ItemNoopAuditSink;
pub use audit::ItemStderrAuditSink;
pub use audit::RequestOutcome;
pub use context::ApiContext;
pub use context::build_item_store;
pub use context::build_logger;
pub use dispatch::ItemMethod;
pub use dispatch::ItemRequest;
pub use dispatch::ItemResponse;
pub use dispatch::dispatch;
pub use server::ApiServerError;
pub use server::ItemServer;
