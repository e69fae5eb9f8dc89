// crates/item-pager-api/src/audit.rs
// ============================================================================
// Module: Item Request Logging
// Description: Structured log events for item request handling.
// Purpose: Emit JSON-line request logs without a logging framework.
// Dependencies: item-pager-config, serde, serde_json
// ============================================================================

//! ## Overview
//! One [`ItemAuditEvent`] is emitted per request. Sinks write events as JSON
//! lines; [`ItemLogger`] drops events below the configured minimum level
//! before they reach the sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use item_pager_config::LogLevel;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Classified result of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// A page of records was returned.
    Listed,
    /// A record was stored.
    Created,
    /// A record was rejected as a duplicate.
    Duplicate,
    /// The request failed validation.
    Invalid,
    /// The request body exceeded the size limit.
    TooLarge,
    /// The method is not served on `/items`.
    MethodNotFound,
    /// The path is not served.
    ResourceNotFound,
    /// The request failed unexpectedly.
    Failed,
}

/// Item request log event payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event severity.
    pub level: LogLevel,
    /// HTTP method token.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Requested 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Requested page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
    /// Title of the submitted record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Number of records returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Underlying error text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemAuditEvent {
    /// Creates an `item_request` event stamped with the current time.
    #[must_use]
    pub fn request(method: &str, path: &str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "item_request",
            timestamp_ms,
            level: LogLevel::Info,
            method: method.to_string(),
            path: path.to_string(),
            status: 0,
            outcome: RequestOutcome::Failed,
            page: None,
            page_size: None,
            title: None,
            records: None,
            request_bytes: 0,
            response_bytes: 0,
            error: None,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink for item request events.
pub trait ItemAuditSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: &ItemAuditEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct ItemStderrAuditSink;

impl ItemAuditSink for ItemStderrAuditSink {
    fn record(&self, event: &ItemAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct ItemFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl ItemFileAuditSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ItemAuditSink for ItemFileAuditSink {
    fn record(&self, event: &ItemAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op sink.
pub struct ItemNoopAuditSink;

impl ItemAuditSink for ItemNoopAuditSink {
    fn record(&self, _event: &ItemAuditEvent) {}
}

// ============================================================================
// SECTION: Logger
// ============================================================================

/// Level-filtering front end for a sink.
#[derive(Clone)]
pub struct ItemLogger {
    /// Destination sink.
    sink: Arc<dyn ItemAuditSink>,
    /// Minimum level forwarded to the sink.
    min_level: LogLevel,
}

impl ItemLogger {
    /// Creates a logger forwarding events at or above `min_level`.
    #[must_use]
    pub fn new(sink: Arc<dyn ItemAuditSink>, min_level: LogLevel) -> Self {
        Self {
            sink,
            min_level,
        }
    }

    /// Creates a logger that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(ItemNoopAuditSink), LogLevel::Error)
    }

    /// Returns true when events at `level` reach the sink.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Forwards the event when its level passes the filter.
    pub fn record(&self, event: &ItemAuditEvent) {
        if self.enabled(event.level) {
            self.sink.record(event);
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
