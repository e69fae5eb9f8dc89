// crates/item-pager-core/src/runtime/writer.rs
// ============================================================================
// Module: Conditional Writer
// Description: Insert-if-absent writes keyed by record title.
// Purpose: Turn duplicate-title conflicts into a typed outcome.
// Dependencies: crate::{core, interfaces}, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! [`ConditionalWriter`] stamps `created` onto the record and asks the store
//! to insert it only if its title is unused. Conflicts come back as
//! [`WriteOutcome::DuplicateRejected`], never as an error.
//!
//! Store faults raised by the conditional insert are absorbed into the same
//! rejection and reported to clients as duplicates. The outcome keeps the two
//! apart through [`RejectionCause`] so hosts can log or surface faults
//! separately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::CreatedAt;
use crate::core::Record;
use crate::core::TimestampError;
use crate::interfaces::ItemStore;
use crate::interfaces::PutError;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Detail value reported for a stored record.
const CREATED_DETAIL: &str = "Created";
/// Detail value reported for a rejected record.
const FAILED_DETAIL: &str = "Failed";
/// Message reported for a rejected record.
const DUPLICATE_MESSAGE: &str = "Duplicate title detected.";

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Why a conditional write was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionCause {
    /// A record with the same title already exists.
    Conflict,
    /// The store failed for another reason during the conditional insert.
    StoreFault(StoreError),
}

/// Result of a conditional write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The record was stored.
    Created {
        /// Stored record, including its `created` stamp.
        record: Record,
    },
    /// The record was not stored.
    DuplicateRejected {
        /// Submitted record, including its `created` stamp.
        record: Record,
        /// Underlying rejection cause.
        cause: RejectionCause,
    },
}

impl WriteOutcome {
    /// Returns the stamped record, stored or not.
    #[must_use]
    pub const fn record(&self) -> &Record {
        match self {
            Self::Created {
                record,
            }
            | Self::DuplicateRejected {
                record, ..
            } => record,
        }
    }

    /// Returns true when the record was stored.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    /// Returns the store fault behind a rejection, if any.
    #[must_use]
    pub const fn store_fault(&self) -> Option<&StoreError> {
        match self {
            Self::DuplicateRejected {
                cause: RejectionCause::StoreFault(err),
                ..
            } => Some(err),
            _ => None,
        }
    }

    /// Builds the client-facing detail object, keyed by record title.
    #[must_use]
    pub fn details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        match self {
            Self::Created {
                record,
            } => {
                details.insert(record.title().to_string(), Value::from(CREATED_DETAIL));
            }
            Self::DuplicateRejected {
                record, ..
            } => {
                details.insert(record.title().to_string(), Value::from(FAILED_DETAIL));
                details.insert("message".to_string(), Value::from(DUPLICATE_MESSAGE));
            }
        }
        details
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that prevent a write attempt from being made.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The creation timestamp could not be rendered.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Insert-if-absent writer over an [`ItemStore`].
#[derive(Debug, Clone)]
pub struct ConditionalWriter<S> {
    /// Backing store.
    store: S,
}

impl<S: ItemStore> ConditionalWriter<S> {
    /// Creates a writer over the store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
        }
    }

    /// Stamps `created` with `now` and inserts the record if its title is
    /// unused.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] only when stamping fails; the store is not
    /// touched in that case.
    pub fn write(&self, mut record: Record, now: OffsetDateTime) -> Result<WriteOutcome, WriteError> {
        let created = CreatedAt::from_datetime(now)?;
        record.stamp_created(&created);
        let outcome = match self.store.put_if_absent(&record) {
            Ok(()) => WriteOutcome::Created {
                record,
            },
            Err(PutError::Conflict {
                ..
            }) => WriteOutcome::DuplicateRejected {
                record,
                cause: RejectionCause::Conflict,
            },
            Err(PutError::Store(err)) => WriteOutcome::DuplicateRejected {
                record,
                cause: RejectionCause::StoreFault(err),
            },
        };
        Ok(outcome)
    }
}
