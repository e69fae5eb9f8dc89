// crates/item-pager-api/src/context.rs
// ============================================================================
// Module: API Context
// Description: Store, logger, and request defaults shared by handlers.
// Purpose: Build request-handling collaborators from configuration once.
// Dependencies: item-pager-core, item-pager-config, item-pager-store-sqlite
// ============================================================================

//! ## Overview
//! [`ApiContext`] bundles everything [`crate::dispatch`] needs. It is built
//! from an [`ItemPagerConfig`] at startup and shared read-only afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use item_pager_config::ItemPagerConfig;
use item_pager_config::LogConfig;
use item_pager_config::LogSinkType;
use item_pager_config::StoreConfig;
use item_pager_config::StoreType;
use item_pager_core::InMemoryItemStore;
use item_pager_core::SharedItemStore;
use item_pager_store_sqlite::SqliteItemStore;

use crate::audit::ItemAuditSink;
use crate::audit::ItemFileAuditSink;
use crate::audit::ItemLogger;
use crate::audit::ItemNoopAuditSink;
use crate::audit::ItemStderrAuditSink;
use crate::server::ApiServerError;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Collaborators and defaults for request handling.
#[derive(Clone)]
pub struct ApiContext {
    /// Backing item store.
    pub store: SharedItemStore,
    /// Page size used when a request omits `page_size`.
    pub default_page_size: i64,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Report write-path store faults as server errors.
    pub surface_store_faults: bool,
    /// Request logger.
    pub logger: ItemLogger,
}

impl ApiContext {
    /// Builds the context described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Init`] when the store or log sink cannot be
    /// opened.
    pub fn from_config(config: &ItemPagerConfig) -> Result<Self, ApiServerError> {
        Ok(Self {
            store: build_item_store(&config.store)?,
            default_page_size: config.pagination.default_page_size,
            max_body_bytes: config.server.max_body_bytes,
            surface_store_faults: config.writes.surface_store_faults,
            logger: build_logger(&config.log)?,
        })
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds the item store from configuration.
///
/// # Errors
///
/// Returns [`ApiServerError`] when the store cannot be opened.
pub fn build_item_store(config: &StoreConfig) -> Result<SharedItemStore, ApiServerError> {
    let store = match config.store_type {
        StoreType::Memory => {
            SharedItemStore::from_store(InMemoryItemStore::with_batch_size(config.scan_batch_size))
        }
        StoreType::Sqlite => {
            let sqlite_config = config.sqlite_config().ok_or_else(|| {
                ApiServerError::Config("sqlite store requires path".to_string())
            })?;
            let store = SqliteItemStore::new(sqlite_config)
                .map_err(|err| ApiServerError::Init(err.to_string()))?;
            SharedItemStore::from_store(store)
        }
    };
    Ok(store)
}

/// Builds the request logger from configuration.
///
/// # Errors
///
/// Returns [`ApiServerError`] when the log file cannot be opened.
pub fn build_logger(config: &LogConfig) -> Result<ItemLogger, ApiServerError> {
    let sink: Arc<dyn ItemAuditSink> = match config.sink {
        LogSinkType::Stderr => Arc::new(ItemStderrAuditSink),
        LogSinkType::None => Arc::new(ItemNoopAuditSink),
        LogSinkType::File => {
            let path = config
                .path
                .as_ref()
                .ok_or_else(|| ApiServerError::Config("file log sink requires path".to_string()))?;
            let sink = ItemFileAuditSink::new(path)
                .map_err(|err| ApiServerError::Init(format!("log file: {err}")))?;
            Arc::new(sink)
        }
    };
    Ok(ItemLogger::new(sink, config.level))
}
