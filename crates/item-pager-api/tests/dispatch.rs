// crates/item-pager-api/tests/dispatch.rs
// ============================================================================
// Module: Dispatcher Tests
// Description: Request routing, validation, and handler behavior.
// Purpose: Exercise GET and POST semantics without a network listener.
// ============================================================================

//! ## Overview
//! Drives [`dispatch`] with in-memory contexts and checks status codes,
//! bodies, store effects, and the request log.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use item_pager_api::ItemRequest;
use item_pager_api::RequestOutcome;
use item_pager_api::dispatch;
use item_pager_config::LogLevel;
use item_pager_core::SharedItemStore;
use serde_json::json;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::common::BrokenStore;
use crate::common::body_json;
use crate::common::context_with;
use crate::common::memory_context;

/// Fixed creation time for submitted records.
const NOW: OffsetDateTime = datetime!(2026-03-01 08:00:00 UTC);

/// Posts a record with `title` and returns the status.
fn post_title(context: &item_pager_api::ApiContext, title: &str) -> u16 {
    let body = json!({"title": title, "description": format!("about {title}")}).to_string();
    dispatch(context, &ItemRequest::post(body), NOW).status
}

// ============================================================================
// SECTION: Routing
// ============================================================================

#[test]
fn unknown_method_is_not_found() {
    let (context, sink) = memory_context();
    let mut request = ItemRequest::get(&[]);
    request.method = "DELETE".to_string();
    let response = dispatch(&context, &request, NOW);
    assert_eq!(response.status, 404);
    assert_eq!(body_json(&response.body), json!({"error": "Method does not exist"}));
    assert_eq!(sink.last().outcome, RequestOutcome::MethodNotFound);
}

#[test]
fn unknown_path_is_not_found() {
    let (context, sink) = memory_context();
    let mut request = ItemRequest::get(&[]);
    request.path = "/things".to_string();
    let response = dispatch(&context, &request, NOW);
    assert_eq!(response.status, 404);
    assert_eq!(body_json(&response.body), json!({"error": "Resource does not exist"}));
    assert_eq!(sink.last().outcome, RequestOutcome::ResourceNotFound);
}

#[test]
fn oversized_body_is_rejected_before_parsing() {
    let (context, sink) = memory_context();
    let response = dispatch(&context, &ItemRequest::post(vec![b'x'; 1025]), NOW);
    assert_eq!(response.status, 413);
    assert_eq!(body_json(&response.body), json!({"details": {"message": "Request body too large."}}));
    let event = sink.last();
    assert_eq!(event.outcome, RequestOutcome::TooLarge);
    assert_eq!(event.request_bytes, 1025);
}

// ============================================================================
// SECTION: Reads
// ============================================================================

#[test]
fn get_uses_default_page_and_size() {
    let (context, sink) = memory_context();
    for index in 0 .. 7 {
        assert_eq!(post_title(&context, &format!("t{index}")), 201);
    }
    let response = dispatch(&context, &ItemRequest::get(&[]), NOW);
    assert_eq!(response.status, 200);
    let titles: Vec<String> = body_json(&response.body)
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["t0", "t1", "t2", "t3", "t4"]);

    let event = sink.last();
    assert_eq!(event.outcome, RequestOutcome::Listed);
    assert_eq!(event.page, Some(1));
    assert_eq!(event.page_size, Some(5));
    assert_eq!(event.records, Some(5));
}

#[test]
fn get_suppresses_short_trailing_page() {
    let (context, _sink) = memory_context();
    for title in ["A", "B", "C", "D", "E"] {
        post_title(&context, title);
    }
    let page = |number: &str| {
        let response =
            dispatch(&context, &ItemRequest::get(&[("page", number), ("page_size", "2")]), NOW);
        assert_eq!(response.status, 200);
        body_json(&response.body)
            .as_array()
            .unwrap()
            .iter()
            .map(|record| record["title"].as_str().unwrap().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(page("1"), vec!["A", "B"]);
    assert_eq!(page("2"), vec!["C", "D"]);
    assert!(page("3").is_empty());
}

#[test]
fn get_with_page_below_one_is_empty() {
    let (context, _sink) = context_with(SharedItemStore::from_store(BrokenStore));
    for number in ["0", "-2"] {
        let response = dispatch(&context, &ItemRequest::get(&[("page", number)]), NOW);
        assert_eq!(response.status, 200, "page {number} should not scan");
        assert_eq!(response.text(), "[]");
    }
}

#[test]
fn get_with_non_positive_size_is_empty() {
    let (context, _sink) = context_with(SharedItemStore::from_store(BrokenStore));
    let response = dispatch(&context, &ItemRequest::get(&[("page_size", "0")]), NOW);
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "[]");
}

#[test]
fn get_with_huge_page_size_over_small_table_is_empty() {
    let (context, sink) = memory_context();
    for title in ["A", "B"] {
        post_title(&context, title);
    }
    for size in ["100000000000", "9223372036854775807"] {
        let response = dispatch(&context, &ItemRequest::get(&[("page_size", size)]), NOW);
        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "[]");
        assert_eq!(sink.last().outcome, RequestOutcome::Listed);
    }
}

#[test]
fn get_rejects_non_integer_parameters() {
    let (context, sink) = memory_context();
    for (name, value) in [("page", "one"), ("page_size", "2.5")] {
        let response = dispatch(&context, &ItemRequest::get(&[(name, value)]), NOW);
        assert_eq!(response.status, 400);
        assert_eq!(
            body_json(&response.body),
            json!({"details": {"message": format!("Invalid pagination parameter: {name}")}})
        );
        assert_eq!(sink.last().outcome, RequestOutcome::Invalid);
    }
}

#[test]
fn get_scan_failure_is_internal_error() {
    let (context, sink) = context_with(SharedItemStore::from_store(BrokenStore));
    let response = dispatch(&context, &ItemRequest::get(&[]), NOW);
    assert_eq!(response.status, 500);
    assert_eq!(body_json(&response.body), json!({"error": "Internal server error"}));
    let event = sink.last();
    assert_eq!(event.level, LogLevel::Error);
    assert!(event.error.unwrap().contains("disk unavailable"));
}

// ============================================================================
// SECTION: Writes
// ============================================================================

#[test]
fn post_creates_then_rejects_duplicate() {
    let (context, sink) = memory_context();
    let first = dispatch(&context, &ItemRequest::post(r#"{"title": "X", "description": "d1"}"#), NOW);
    assert_eq!(first.status, 201);
    assert_eq!(body_json(&first.body), json!({"details": {"X": "Created"}}));

    let second = dispatch(&context, &ItemRequest::post(r#"{"title": "X", "description": "d2"}"#), NOW);
    assert_eq!(second.status, 400);
    assert_eq!(
        body_json(&second.body),
        json!({"details": {"X": "Failed", "message": "Duplicate title detected."}})
    );
    let event = sink.last();
    assert_eq!(event.outcome, RequestOutcome::Duplicate);
    assert_eq!(event.level, LogLevel::Warn);
    assert_eq!(event.title.as_deref(), Some("X"));

    let page = dispatch(&context, &ItemRequest::get(&[("page_size", "1")]), NOW);
    assert_eq!(
        body_json(&page.body),
        json!([{"title": "X", "description": "d1", "created": "2026-03-01T08:00:00Z"}])
    );
}

#[test]
fn post_rejects_non_object_bodies() {
    let (context, _sink) = memory_context();
    for body in [r#"[{"title": "A"}]"#, r#""A""#, "42"] {
        let response = dispatch(&context, &ItemRequest::post(body), NOW);
        assert_eq!(response.status, 400);
        assert_eq!(
            body_json(&response.body),
            json!({"details": {"message": "Arrays are not supported."}})
        );
    }
    let page = dispatch(&context, &ItemRequest::get(&[]), NOW);
    assert_eq!(page.text(), "[]");
}

#[test]
fn post_rejects_malformed_json_and_missing_title() {
    let (context, _sink) = memory_context();
    let malformed = dispatch(&context, &ItemRequest::post("{not json"), NOW);
    assert_eq!(malformed.status, 400);
    assert_eq!(body_json(&malformed.body), json!({"details": {"message": "Malformed JSON body."}}));

    for body in [r#"{"description": "x"}"#, r#"{"title": ""}"#, r#"{"title": 7}"#] {
        let response = dispatch(&context, &ItemRequest::post(body), NOW);
        assert_eq!(response.status, 400);
        assert_eq!(
            body_json(&response.body),
            json!({"details": {"message": "Missing or empty title."}})
        );
    }
}

#[test]
fn store_fault_is_reported_as_duplicate_by_default() {
    let (context, sink) = context_with(SharedItemStore::from_store(BrokenStore));
    assert_eq!(post_title(&context, "A"), 400);
    let event = sink.last();
    assert_eq!(event.outcome, RequestOutcome::Duplicate);
    assert_eq!(event.level, LogLevel::Warn);
    assert!(event.error.unwrap().contains("disk unavailable"));
}

#[test]
fn store_fault_is_surfaced_when_configured() {
    let (mut context, sink) = context_with(SharedItemStore::from_store(BrokenStore));
    context.surface_store_faults = true;
    assert_eq!(post_title(&context, "A"), 500);
    let event = sink.last();
    assert_eq!(event.outcome, RequestOutcome::Failed);
    assert_eq!(event.level, LogLevel::Error);
}

#[test]
fn every_request_is_logged_once() {
    let (context, sink) = memory_context();
    post_title(&context, "A");
    let _ = dispatch(&context, &ItemRequest::get(&[]), NOW);
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event.event == "item_request"));
    assert_eq!(events[0].status, 201);
    assert_eq!(events[1].status, 200);
}
