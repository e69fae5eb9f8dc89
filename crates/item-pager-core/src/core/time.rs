// crates/item-pager-core/src/core/time.rs
// ============================================================================
// Module: Item Pager Time Model
// Description: Creation timestamps stamped onto records at write time.
// Purpose: Keep wall-clock reads in the host and formatting in one place.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! The core never reads wall-clock time. Hosts pass an [`OffsetDateTime`] to
//! the writer, which normalizes it to UTC and renders RFC 3339 with
//! sub-second precision (for example `2026-10-18T09:30:12.123456Z`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Timestamp formatting errors.
#[derive(Debug, Error)]
#[error("timestamp formatting failed: {0}")]
pub struct TimestampError(String);

// ============================================================================
// SECTION: Created Timestamp
// ============================================================================

/// RFC 3339 UTC creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatedAt(String);

impl CreatedAt {
    /// Formats a point in time as a UTC creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] when the value cannot be represented in
    /// RFC 3339 (years outside 0..=9999).
    pub fn from_datetime(at: OffsetDateTime) -> Result<Self, TimestampError> {
        at.to_offset(UtcOffset::UTC)
            .format(&Rfc3339)
            .map(Self)
            .map_err(|err| TimestampError(err.to_string()))
    }

    /// Returns the timestamp as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CreatedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
