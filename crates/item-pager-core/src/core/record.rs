// crates/item-pager-core/src/core/record.rs
// ============================================================================
// Module: Item Records
// Description: JSON-object records keyed by a unique title.
// Purpose: Validate inbound payloads once and keep the title invariant typed.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`Record`] is a JSON object with a non-empty string `title`, the table's
//! partition key. Any other fields are carried through untouched. Records are
//! validated when constructed or deserialized, so every `Record` in the
//! system satisfies the title invariant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::time::CreatedAt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field holding the record's unique title (partition key).
pub const TITLE_FIELD: &str = "title";
/// Conventional free-text description field.
pub const DESCRIPTION_FIELD: &str = "description";
/// Server-stamped creation timestamp field.
pub const CREATED_FIELD: &str = "created";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Record validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Payload is not a single JSON object (array, string, number, ...).
    #[error("record payload must be a json object")]
    NotAnObject,
    /// Object has no title, or the title is not a non-empty string.
    #[error("record title must be a non-empty string")]
    MissingTitle,
}

impl RecordError {
    /// Returns the user-facing message reported for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotAnObject => "Arrays are not supported.",
            Self::MissingTitle => "Missing or empty title.",
        }
    }
}

// ============================================================================
// SECTION: Record
// ============================================================================

/// A stored item: a JSON object with a unique, non-empty `title`.
///
/// # Invariants
/// - `title` is present and is a non-empty JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    /// Record fields, ordered by key.
    fields: Map<String, Value>,
}

impl Record {
    /// Builds a record from an arbitrary JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotAnObject`] for non-object payloads and
    /// [`RecordError::MissingTitle`] when the title is absent or empty.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            _ => Err(RecordError::NotAnObject),
        }
    }

    /// Builds a record from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MissingTitle`] when the title is absent or empty.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, RecordError> {
        match fields.get(TITLE_FIELD) {
            Some(Value::String(title)) if !title.is_empty() => Ok(Self {
                fields,
            }),
            _ => Err(RecordError::MissingTitle),
        }
    }

    /// Returns the record title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.fields.get(TITLE_FIELD).and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns a field value by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the creation timestamp when the record has been stamped.
    #[must_use]
    pub fn created(&self) -> Option<&str> {
        self.fields.get(CREATED_FIELD).and_then(Value::as_str)
    }

    /// Returns all record fields.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Sets the `created` field, replacing any client-supplied value.
    pub fn stamp_created(&mut self, created: &CreatedAt) {
        self.fields.insert(CREATED_FIELD.to_string(), Value::String(created.as_str().to_string()));
    }

    /// Consumes the record and returns it as a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = RecordError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
