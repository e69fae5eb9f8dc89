// crates/item-pager-api/src/dispatch.rs
// ============================================================================
// Module: Request Dispatcher
// Description: Method routing and handlers for the /items collection.
// Purpose: Resolve transport-neutral requests into JSON responses.
// Dependencies: item-pager-core, serde, serde_json, time
// ============================================================================

//! ## Overview
//! [`dispatch`] routes an [`ItemRequest`] by path and method token and
//! returns a rendered [`ItemResponse`]. `GET` reads one page of records and
//! `POST` submits one record through the conditional writer. Anything else
//! on `/items` is answered with "Method does not exist"; any other path with
//! "Resource does not exist".
//!
//! The dispatcher never reads the clock for record stamps; callers pass the
//! creation time in. Response bodies are pretty-printed with a four-space
//! indent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::collections::HashMap;

use item_pager_config::LogLevel;
use item_pager_core::ConditionalWriter;
use item_pager_core::PageRequest;
use item_pager_core::Record;
use item_pager_core::get_page;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use serde_json::ser::PrettyFormatter;
use time::OffsetDateTime;

use crate::audit::ItemAuditEvent;
use crate::audit::RequestOutcome;
use crate::context::ApiContext;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path of the item collection.
pub const ITEMS_PATH: &str = "/items";
/// Content type of every response.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Query parameter naming the 1-based page.
const PAGE_PARAM: &str = "page";
/// Query parameter naming the page size.
const PAGE_SIZE_PARAM: &str = "page_size";
/// Page requested when the query omits one.
const DEFAULT_PAGE: i64 = 1;
/// Message for bodies that are not JSON.
const MALFORMED_BODY_MESSAGE: &str = "Malformed JSON body.";
/// Message for bodies over the size limit.
const TOO_LARGE_MESSAGE: &str = "Request body too large.";
/// Fallback body when rendering fails.
const INTERNAL_ERROR_BODY: &str = "{\n    \"error\": \"Internal server error\"\n}";

// ============================================================================
// SECTION: Requests and Responses
// ============================================================================

/// Methods served on the item collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMethod {
    /// Read one page of records.
    Get,
    /// Submit one record.
    Post,
}

impl ItemMethod {
    /// Parses an HTTP method token. Tokens are case-sensitive.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }
}

/// Transport-neutral request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequest {
    /// HTTP method token.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Decoded query parameters.
    pub query: HashMap<String, String>,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl ItemRequest {
    /// Builds a `GET /items` request with the given query parameters.
    #[must_use]
    pub fn get(query: &[(&str, &str)]) -> Self {
        Self {
            method: "GET".to_string(),
            path: ITEMS_PATH.to_string(),
            query: query.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect(),
            body: Vec::new(),
        }
    }

    /// Builds a `POST /items` request carrying `body`.
    #[must_use]
    pub fn post(body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: "POST".to_string(),
            path: ITEMS_PATH.to_string(),
            query: HashMap::new(),
            body: body.into(),
        }
    }
}

/// Rendered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResponse {
    /// HTTP status code.
    pub status: u16,
    /// Pretty-printed JSON body.
    pub body: Vec<u8>,
}

impl ItemResponse {
    /// Renders `value` as the body of a response with `status`.
    #[must_use]
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            body: render_pretty(value),
        }
    }

    /// Returns the body as text.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Response for paths other than `/items`.
    #[must_use]
    pub fn resource_not_found() -> Self {
        Self::json(404, &json!({"error": "Resource does not exist"}))
    }

    /// Response for unsupported methods on `/items`.
    #[must_use]
    pub fn method_not_found() -> Self {
        Self::json(404, &json!({"error": "Method does not exist"}))
    }

    /// Response for bodies over the size limit.
    #[must_use]
    pub fn too_large() -> Self {
        Self::json(413, &json!({"details": {"message": TOO_LARGE_MESSAGE}}))
    }

    /// Response for unhandled failures.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::json(500, &json!({"error": "Internal server error"}))
    }

    /// Response for a request that failed validation.
    fn invalid(message: &str) -> Self {
        Self::json(400, &json!({"details": {"message": message}}))
    }

    /// Response carrying a write outcome.
    fn details(status: u16, details: Map<String, Value>) -> Self {
        let mut body = Map::new();
        body.insert("details".to_string(), Value::Object(details));
        Self::json(status, &Value::Object(body))
    }
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Routes one request and logs its outcome.
///
/// `now` stamps the `created` field of submitted records.
#[must_use]
pub fn dispatch(context: &ApiContext, request: &ItemRequest, now: OffsetDateTime) -> ItemResponse {
    let mut event = ItemAuditEvent::request(&request.method, &request.path);
    event.request_bytes = request.body.len();
    let response = route(context, request, now, &mut event);
    event.status = response.status;
    event.response_bytes = response.body.len();
    context.logger.record(&event);
    response
}

/// Selects the handler for the request.
fn route(
    context: &ApiContext,
    request: &ItemRequest,
    now: OffsetDateTime,
    event: &mut ItemAuditEvent,
) -> ItemResponse {
    if request.path != ITEMS_PATH {
        event.outcome = RequestOutcome::ResourceNotFound;
        return ItemResponse::resource_not_found();
    }
    if request.body.len() > context.max_body_bytes {
        event.level = LogLevel::Warn;
        event.outcome = RequestOutcome::TooLarge;
        return ItemResponse::too_large();
    }
    match ItemMethod::parse(&request.method) {
        Some(ItemMethod::Get) => read_items(context, &request.query, event),
        Some(ItemMethod::Post) => write_item(context, &request.body, now, event),
        None => {
            event.outcome = RequestOutcome::MethodNotFound;
            ItemResponse::method_not_found()
        }
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Returns one page of records as a JSON array.
fn read_items(
    context: &ApiContext,
    query: &HashMap<String, String>,
    event: &mut ItemAuditEvent,
) -> ItemResponse {
    let params = parse_param(query, PAGE_PARAM, DEFAULT_PAGE).and_then(|page| {
        parse_param(query, PAGE_SIZE_PARAM, context.default_page_size).map(|size| (page, size))
    });
    let (page, page_size) = match params {
        Ok(params) => params,
        Err(name) => {
            event.level = LogLevel::Warn;
            event.outcome = RequestOutcome::Invalid;
            event.error = Some(format!("invalid {name}"));
            return ItemResponse::invalid(&format!("Invalid pagination parameter: {name}"));
        }
    };
    event.page = Some(page);
    event.page_size = Some(page_size);
    let records = match PageRequest::from_page_number(page, page_size) {
        None => Vec::new(),
        Some(request) => match get_page(&context.store, request) {
            Ok(records) => records,
            Err(err) => {
                event.level = LogLevel::Error;
                event.outcome = RequestOutcome::Failed;
                event.error = Some(err.to_string());
                return ItemResponse::internal_error();
            }
        },
    };
    event.outcome = RequestOutcome::Listed;
    event.records = Some(records.len());
    ItemResponse::json(200, &Value::Array(records.into_iter().map(Record::into_value).collect()))
}

/// Submits one record through the conditional writer.
fn write_item(
    context: &ApiContext,
    body: &[u8],
    now: OffsetDateTime,
    event: &mut ItemAuditEvent,
) -> ItemResponse {
    let record = match serde_json::from_slice::<Value>(body) {
        Err(err) => {
            event.level = LogLevel::Warn;
            event.outcome = RequestOutcome::Invalid;
            event.error = Some(err.to_string());
            return ItemResponse::invalid(MALFORMED_BODY_MESSAGE);
        }
        Ok(value) => match Record::from_value(value) {
            Ok(record) => record,
            Err(err) => {
                event.level = LogLevel::Warn;
                event.outcome = RequestOutcome::Invalid;
                event.error = Some(err.to_string());
                return ItemResponse::invalid(err.user_message());
            }
        },
    };
    event.title = Some(record.title().to_string());
    let outcome = match ConditionalWriter::new(&context.store).write(record, now) {
        Ok(outcome) => outcome,
        Err(err) => {
            event.level = LogLevel::Error;
            event.outcome = RequestOutcome::Failed;
            event.error = Some(err.to_string());
            return ItemResponse::internal_error();
        }
    };
    if let Some(fault) = outcome.store_fault() {
        event.error = Some(fault.to_string());
        if context.surface_store_faults {
            event.level = LogLevel::Error;
            event.outcome = RequestOutcome::Failed;
            return ItemResponse::internal_error();
        }
    }
    if outcome.is_created() {
        event.outcome = RequestOutcome::Created;
        ItemResponse::details(201, outcome.details())
    } else {
        event.level = LogLevel::Warn;
        event.outcome = RequestOutcome::Duplicate;
        ItemResponse::details(400, outcome.details())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an integer query parameter, falling back to `default` when absent.
/// Returns the parameter name on parse failure.
fn parse_param(
    query: &HashMap<String, String>,
    name: &'static str,
    default: i64,
) -> Result<i64, &'static str> {
    query.get(name).map_or(Ok(default), |value| value.trim().parse().map_err(|_| name))
}

/// Serializes `value` with a four-space indent.
fn render_pretty(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    if value.serialize(&mut serializer).is_err() {
        return INTERNAL_ERROR_BODY.as_bytes().to_vec();
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
