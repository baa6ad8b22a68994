//! Availability projection math.
//!
//! Turns catalog templates plus per-time booked counts into the
//! `SlotStatus` rows shown to customers. Everything here is pure so the
//! thresholds can be tested without a database.

use std::collections::HashMap;

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::catalog::SlotTemplate;
use crate::types::DbId;

/// Customer-facing state of one slot on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Available,
    Limited,
    Full,
    Inactive,
}

/// Classify a slot from its capacity and the number of confirmed bookings.
pub fn slot_state(capacity: i32, booked: i64, is_active: bool) -> SlotState {
    if !is_active {
        return SlotState::Inactive;
    }
    let capacity = i64::from(capacity);
    if booked >= capacity {
        SlotState::Full
    } else if capacity - booked == 1 {
        SlotState::Limited
    } else {
        SlotState::Available
    }
}

/// Whether a customer may select the slot.
pub fn is_clickable(capacity: i32, booked: i64, is_active: bool) -> bool {
    is_active && booked < i64::from(capacity)
}

/// Render a time of day on a 12-hour clock, e.g. `9:30 AM`, `12:00 PM`.
pub fn format_display_time(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {suffix}", time.minute())
}

/// One row of the availability projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotStatus {
    pub slot_id: DbId,
    /// 24-hour `HH:MM:SS`.
    pub time_slot: String,
    pub display_time: String,
    pub capacity: i32,
    pub booked: i64,
    pub available: i64,
    pub is_active: bool,
    pub status: SlotState,
    #[serde(rename = "isClickable")]
    pub is_clickable: bool,
}

impl SlotStatus {
    pub fn from_template(template: &SlotTemplate, booked: i64) -> Self {
        let capacity = template.capacity;
        Self {
            slot_id: template.id,
            time_slot: template.time_of_day.format("%H:%M:%S").to_string(),
            display_time: format_display_time(template.time_of_day),
            capacity,
            booked,
            available: (i64::from(capacity) - booked).max(0),
            is_active: template.is_active,
            status: slot_state(capacity, booked, template.is_active),
            is_clickable: is_clickable(capacity, booked, template.is_active),
        }
    }
}

/// Availability of every slot on a date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAvailability {
    #[serde(rename = "isShopOpen")]
    pub is_shop_open: bool,
    pub slots: Vec<SlotStatus>,
}

impl DayAvailability {
    /// The short-circuit result for a closed date.
    pub fn closed() -> Self {
        Self {
            is_shop_open: false,
            slots: Vec::new(),
        }
    }
}

/// Project deduplicated templates against booked counts keyed by time of day.
///
/// Times absent from `booked` have zero bookings. Output follows the order
/// of `templates`.
pub fn project_slots(
    templates: &[SlotTemplate],
    booked: &HashMap<NaiveTime, i64>,
) -> Vec<SlotStatus> {
    templates
        .iter()
        .map(|t| SlotStatus::from_template(t, booked.get(&t.time_of_day).copied().unwrap_or(0)))
        .collect()
}
