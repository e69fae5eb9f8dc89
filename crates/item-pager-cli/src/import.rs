// crates/item-pager-cli/src/import.rs
// ============================================================================
// Module: Import Payloads
// Description: Decoding of bulk import files into POST bodies.
// Purpose: Feed records through the same path as HTTP submissions.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Two file shapes are accepted. A top-level array submits each element
//! unchanged. An object with a `posts` array maps each entry's `title` and
//! `body` onto `title` and `description`; other entry fields are dropped.
//! Entries are not validated here; the dispatcher rejects bad ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field holding entries in the posts shape.
const POSTS_FIELD: &str = "posts";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Import file decoding failures.
#[derive(Debug, Error)]
pub(crate) enum ImportError {
    /// The file is not JSON.
    #[error("import file is not valid json: {0}")]
    Json(String),
    /// The JSON has neither accepted shape.
    #[error("import file must be an array of records or an object with a posts array")]
    Shape,
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes an import file into serialized POST bodies, in file order.
pub(crate) fn import_bodies(bytes: &[u8]) -> Result<Vec<String>, ImportError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| ImportError::Json(err.to_string()))?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove(POSTS_FIELD) {
            Some(Value::Array(posts)) => posts.into_iter().map(post_to_record).collect(),
            _ => return Err(ImportError::Shape),
        },
        _ => return Err(ImportError::Shape),
    };
    Ok(entries.iter().map(Value::to_string).collect())
}

/// Maps a `{title, body}` post onto a `{title, description}` record.
fn post_to_record(post: Value) -> Value {
    let Value::Object(mut post) = post else {
        return post;
    };
    let mut record = Map::new();
    if let Some(title) = post.remove("title") {
        record.insert("title".to_string(), title);
    }
    if let Some(body) = post.remove("body") {
        record.insert("description".to_string(), body);
    }
    Value::Object(record)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
