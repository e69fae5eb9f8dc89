// crates/item-pager-api/tests/common/mod.rs
// ============================================================================
// Module: API Test Fixtures
// Description: Contexts, capturing log sinks, and failing stores.
// Purpose: Drive the dispatcher and server with observable collaborators.
// Dependencies: item-pager-api, item-pager-core, item-pager-config
// ============================================================================

//! ## Overview
//! Fixtures build an [`ApiContext`] over an in-memory store and capture every
//! log event so tests can assert on request logging.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

use std::sync::Arc;
use std::sync::Mutex;

use item_pager_api::ApiContext;
use item_pager_api::ItemAuditEvent;
use item_pager_api::ItemAuditSink;
use item_pager_api::ItemLogger;
use item_pager_config::LogLevel;
use item_pager_core::InMemoryItemStore;
use item_pager_core::ItemStore;
use item_pager_core::PutError;
use item_pager_core::Record;
use item_pager_core::ScanBatch;
use item_pager_core::ScanCursor;
use item_pager_core::SharedItemStore;
use item_pager_core::StoreError;
use serde_json::Value;

/// Sink that keeps every event in memory.
#[derive(Default)]
pub struct CaptureSink {
    /// Recorded events.
    events: Mutex<Vec<ItemAuditEvent>>,
}

impl CaptureSink {
    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<ItemAuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the most recent event.
    pub fn last(&self) -> ItemAuditEvent {
        self.events.lock().unwrap().last().cloned().expect("no events recorded")
    }
}

impl ItemAuditSink for CaptureSink {
    fn record(&self, event: &ItemAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Store whose scans and puts always fail.
pub struct BrokenStore;

impl ItemStore for BrokenStore {
    fn scan(&self, _cursor: Option<&ScanCursor>) -> Result<ScanBatch, StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }

    fn put_if_absent(&self, _record: &Record) -> Result<(), PutError> {
        Err(PutError::Store(StoreError::Io("disk unavailable".to_string())))
    }
}

/// Builds a context over `store` with a capturing debug-level logger.
pub fn context_with(store: SharedItemStore) -> (ApiContext, Arc<CaptureSink>) {
    let sink = Arc::new(CaptureSink::default());
    let context = ApiContext {
        store,
        default_page_size: 5,
        max_body_bytes: 1024,
        surface_store_faults: false,
        logger: ItemLogger::new(sink.clone(), LogLevel::Debug),
    };
    (context, sink)
}

/// Builds a context over an empty in-memory store with a small batch size.
pub fn memory_context() -> (ApiContext, Arc<CaptureSink>) {
    context_with(SharedItemStore::from_store(InMemoryItemStore::with_batch_size(3)))
}

/// Parses a response body.
pub fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}
