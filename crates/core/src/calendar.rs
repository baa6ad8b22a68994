//! Weekly shop calendar.
//!
//! The open/closed decision is purely a function of the day of week
//! (0 = Sunday .. 6 = Saturday). There are no per-date overrides.

use chrono::{Datelike, NaiveDate};

use crate::error::CoreError;

/// Day of week with Sunday = 0.
pub fn day_of_week(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

pub fn validate_day_of_week(day: i16) -> Result<(), CoreError> {
    if !(0..=6).contains(&day) {
        return Err(CoreError::Validation(format!(
            "day_of_week must be between 0 (Sunday) and 6 (Saturday), got {day}"
        )));
    }
    Ok(())
}

pub fn day_name(day: i16) -> &'static str {
    match day {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}
