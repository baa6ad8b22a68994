//! Appointment booking vocabulary: service types, booking status and hold
//! state machines, and request input parsing.
//!
//! Status and hold-state IDs match the seed data of the
//! `appointment_statuses` / `appointment_hold_states` lookup tables. They are
//! duplicated from the `db` crate's enums because `core` must have zero
//! internal deps.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Service types
// ---------------------------------------------------------------------------

/// The kind of in-store service an appointment is booked for.
///
/// Capacity is pooled across all service types sharing a `(date, time)`
/// slot; the service type is recorded on the booking but never partitions
/// the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    DryCleaning,
    Repair,
    Customization,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::DryCleaning,
        ServiceType::Repair,
        ServiceType::Customization,
    ];

    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::DryCleaning => "dry_cleaning",
            ServiceType::Repair => "repair",
            ServiceType::Customization => "customization",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dry_cleaning" => Ok(ServiceType::DryCleaning),
            "repair" => Ok(ServiceType::Repair),
            "customization" => Ok(ServiceType::Customization),
            other => Err(CoreError::Validation(format!(
                "Unknown service type '{other}'. Expected one of: dry_cleaning, repair, customization"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Booking status state machine
// ---------------------------------------------------------------------------

pub const STATUS_BOOKED: i16 = 1;
pub const STATUS_COMPLETED: i16 = 2;
pub const STATUS_CANCELLED: i16 = 3;

pub mod state_machine {
    use super::{STATUS_BOOKED, STATUS_CANCELLED, STATUS_COMPLETED};

    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Completed and Cancelled are terminal.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            STATUS_BOOKED => &[STATUS_COMPLETED, STATUS_CANCELLED],
            STATUS_COMPLETED | STATUS_CANCELLED => &[],
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!(
                "Invalid transition: {} ({from}) -> {} ({to})",
                status_name(from),
                status_name(to)
            ))
        }
    }

    /// Human-readable name for a status ID.
    pub fn status_name(id: i16) -> &'static str {
        match id {
            STATUS_BOOKED => "booked",
            STATUS_COMPLETED => "completed",
            STATUS_CANCELLED => "cancelled",
            _ => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Hold state
// ---------------------------------------------------------------------------

/// Cart-stage reservation. Does not consume capacity.
pub const HOLD_UNCONFIRMED: i16 = 1;
/// Order-linked (or direct) booking. Counts toward capacity.
pub const HOLD_CONFIRMED: i16 = 2;

/// Hold state a freshly booked row starts in.
///
/// Bookings made from a cart item are soft holds until the checkout flow
/// promotes them to an order item; bookings made without one are confirmed
/// immediately.
pub fn initial_hold_state(cart_item_id: Option<i64>) -> i16 {
    if cart_item_id.is_some() {
        HOLD_UNCONFIRMED
    } else {
        HOLD_CONFIRMED
    }
}

pub fn hold_state_name(id: i16) -> &'static str {
    match id {
        HOLD_UNCONFIRMED => "unconfirmed",
        HOLD_CONFIRMED => "confirmed",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// Unwrap a required query/body parameter, rejecting missing or blank values.
pub fn require_param<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, CoreError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("{name} is required"))),
    }
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        CoreError::Validation(format!("Invalid date '{raw}'. Expected YYYY-MM-DD"))
    })
}

/// Parse a wall-clock time of day in `HH:MM` or `HH:MM:SS` form.
///
/// Slots have minute precision, so a non-zero seconds component is rejected.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, CoreError> {
    let trimmed = raw.trim();
    let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| {
            CoreError::Validation(format!("Invalid time '{raw}'. Expected HH:MM or HH:MM:SS"))
        })?;

    if parsed.second() != 0 || parsed.nanosecond() != 0 {
        return Err(CoreError::Validation(format!(
            "Invalid time '{raw}'. Appointment times have minute precision"
        )));
    }
    Ok(parsed)
}
