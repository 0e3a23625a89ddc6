//! Reservation domain model.
//!
//! # Responsibility
//! - Represent one booking held by a customer.
//! - Validate guest count and start time before persistence.
//! - Render the start time for display.
//!
//! # Invariants
//! - `num_guests >= 1` at all times; the field is only reachable through
//!   [`Reservation::set_num_guests`].
//! - `start_at` must parse as a date/time before the record is saved.
//! - Persisted `start_at` text uses [`STORED_START_AT_FORMAT`], so text order
//!   matches chronological order.

use crate::model::customer::CustomerId;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned numeric reservation identity.
pub type ReservationId = i64;

/// Minimum party size accepted for a booking.
pub const MIN_GUESTS: i64 = 1;

/// Layout written to the store. Fractional seconds are omitted when zero.
pub const STORED_START_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const NAIVE_START_AT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Validation failure for reservation fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationValidationError {
    /// Guest count below [`MIN_GUESTS`].
    TooFewGuests(i64),
    /// `start_at` is not a recognizable date/time.
    InvalidStartAt(String),
}

impl Display for ReservationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewGuests(value) => {
                write!(f, "number of guests must be at least {MIN_GUESTS}, got {value}")
            }
            Self::InvalidStartAt(value) => write!(f, "invalid start date: `{value}`"),
        }
    }
}

impl Error for ReservationValidationError {}

/// A booking for one customer at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// `None` until the first successful save.
    pub id: Option<ReservationId>,
    pub customer_id: CustomerId,
    num_guests: i64,
    /// Start time as supplied by the caller; rewritten to
    /// [`STORED_START_AT_FORMAT`] by a successful save.
    pub start_at: String,
    pub notes: Option<String>,
}

impl Reservation {
    /// Creates a transient reservation.
    ///
    /// # Errors
    /// - `TooFewGuests` when `num_guests < 1`.
    ///
    /// `start_at` is checked later by [`Reservation::validate`].
    pub fn new(
        customer_id: CustomerId,
        num_guests: i64,
        start_at: impl Into<String>,
    ) -> Result<Self, ReservationValidationError> {
        check_num_guests(num_guests)?;
        Ok(Self {
            id: None,
            customer_id,
            num_guests,
            start_at: start_at.into(),
            notes: None,
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn num_guests(&self) -> i64 {
        self.num_guests
    }

    /// Updates the party size.
    ///
    /// On error the current value is left untouched.
    pub fn set_num_guests(&mut self, num_guests: i64) -> Result<(), ReservationValidationError> {
        check_num_guests(num_guests)?;
        self.num_guests = num_guests;
        Ok(())
    }

    /// Parses `start_at`.
    ///
    /// Accepts RFC 3339 (kept as the wall-clock time of its own offset),
    /// `YYYY-MM-DD[T| ]HH:MM[:SS[.fff]]`, or a bare `YYYY-MM-DD`.
    pub fn validate_start_at(&self) -> Result<NaiveDateTime, ReservationValidationError> {
        parse_start_at(&self.start_at)
            .ok_or_else(|| ReservationValidationError::InvalidStartAt(self.start_at.clone()))
    }

    /// Runs every field check; called by the repository before any write.
    pub fn validate(&self) -> Result<(), ReservationValidationError> {
        self.validate_start_at()?;
        check_num_guests(self.num_guests)
    }

    /// Returns `start_at` in the layout the store keeps.
    pub fn canonical_start_at(&self) -> Result<String, ReservationValidationError> {
        Ok(self
            .validate_start_at()?
            .format(STORED_START_AT_FORMAT)
            .to_string())
    }

    /// Renders the start time as e.g. `April 5th 2024, 7:30 pm`.
    pub fn formatted_start_at(&self) -> Result<String, ReservationValidationError> {
        let start_at = self.validate_start_at()?;
        Ok(format!(
            "{} {}{} {}",
            start_at.format("%B"),
            start_at.day(),
            ordinal_suffix(start_at.day()),
            start_at.format("%Y, %-I:%M %P")
        ))
    }

    /// Rebuilds a persisted reservation from a store row.
    pub(crate) fn from_row_parts(
        id: ReservationId,
        customer_id: CustomerId,
        num_guests: i64,
        start_at: String,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Some(id),
            customer_id,
            num_guests,
            start_at,
            notes,
        }
    }
}

fn check_num_guests(num_guests: i64) -> Result<(), ReservationValidationError> {
    if num_guests < MIN_GUESTS {
        return Err(ReservationValidationError::TooFewGuests(num_guests));
    }
    Ok(())
}

fn parse_start_at(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_local());
    }

    NAIVE_START_AT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
