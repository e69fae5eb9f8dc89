// crates/item-pager-api/src/server.rs
// ============================================================================
// Module: Item HTTP Server
// Description: axum server exposing the /items collection.
// Purpose: Bridge HTTP requests to the dispatcher on the blocking pool.
// Dependencies: item-pager-config, axum, tokio, time
// ============================================================================

//! ## Overview
//! [`ItemServer`] owns the validated configuration and the [`ApiContext`]
//! built from it. Every request, routed or not, goes through
//! [`crate::dispatch::dispatch`], so unknown paths are logged like any other
//! request. Store access is blocking and runs under `block_in_place` on
//! multi-thread runtimes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::OriginalUri;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::any;
use item_pager_config::ItemPagerConfig;
use item_pager_config::LogLevel;
use time::OffsetDateTime;
use tokio::net::TcpListener;

use crate::audit::ItemAuditEvent;
use crate::audit::RequestOutcome;
use crate::context::ApiContext;
use crate::dispatch::ITEMS_PATH;
use crate::dispatch::ItemRequest;
use crate::dispatch::ItemResponse;
use crate::dispatch::JSON_CONTENT_TYPE;
use crate::dispatch::dispatch;

// ============================================================================
// SECTION: Item Server
// ============================================================================

/// HTTP server for the item collection.
pub struct ItemServer {
    /// Server configuration.
    config: ItemPagerConfig,
    /// Shared request-handling context.
    context: Arc<ApiContext>,
}

impl ItemServer {
    /// Builds a server from configuration, opening the store and log sink.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when configuration is invalid or
    /// initialization fails.
    pub fn from_config(config: ItemPagerConfig) -> Result<Self, ApiServerError> {
        config.validate().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let context = ApiContext::from_config(&config)?;
        Ok(Self::with_context(config, context))
    }

    /// Builds a server around an existing context.
    #[must_use]
    pub fn with_context(config: ItemPagerConfig, context: ApiContext) -> Self {
        Self {
            config,
            context: Arc::new(context),
        }
    }

    /// Returns the request-handling context.
    #[must_use]
    pub fn context(&self) -> &ApiContext {
        &self.context
    }

    /// Builds the axum router for this server.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = Arc::clone(&self.context);
        Router::new()
            .route(ITEMS_PATH, any(handle_request))
            .fallback(handle_request)
            .layer(DefaultBodyLimit::max(self.context.max_body_bytes))
            .with_state(state)
    }

    /// Binds the configured address and serves until the server fails.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ApiServerError> {
        let addr: SocketAddr =
            self.config.server.bind_addr().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ApiServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_listener(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when serving fails.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), ApiServerError> {
        let app = self.router();
        axum::serve(listener, app)
            .await
            .map_err(|err| ApiServerError::Transport(format!("http server failed: {err}")))
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles every HTTP request.
async fn handle_request(
    State(context): State<Arc<ApiContext>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<HashMap<String, String>>, axum::extract::rejection::QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return reject_body(&context, method.as_str(), uri.path(), &rejection),
    };
    let request = ItemRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query: query.map(|Query(params)| params).unwrap_or_default(),
        body: body.to_vec(),
    };
    let response = dispatch_with_blocking(&context, &request);
    into_http(response)
}

/// Answers a request whose body could not be read.
fn reject_body(context: &ApiContext, method: &str, path: &str, rejection: &BytesRejection) -> Response {
    let too_large = rejection.status() == StatusCode::PAYLOAD_TOO_LARGE;
    let response = if too_large { ItemResponse::too_large() } else { ItemResponse::internal_error() };
    let mut event = ItemAuditEvent::request(method, path);
    event.level = if too_large { LogLevel::Warn } else { LogLevel::Error };
    event.outcome = if too_large { RequestOutcome::TooLarge } else { RequestOutcome::Failed };
    event.status = response.status;
    event.response_bytes = response.body.len();
    event.error = Some(rejection.body_text());
    context.logger.record(&event);
    into_http(response)
}

/// Runs the dispatcher, shifting to a blocking context when available.
fn dispatch_with_blocking(context: &ApiContext, request: &ItemRequest) -> ItemResponse {
    let now = OffsetDateTime::now_utc();
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| dispatch(context, request, now))
        }
        _ => dispatch(context, request, now),
    }
}

/// Converts a rendered response into an HTTP response.
fn into_http(response: ItemResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], response.body).into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Item server errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
