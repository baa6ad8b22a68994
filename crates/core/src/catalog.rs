//! Time slot catalog rules: default seed, capacity validation and
//! read-time deduplication of legacy duplicate rows.

use chrono::{Duration, NaiveTime};

use crate::error::CoreError;
use crate::types::DbId;

/// Capacity given to every seeded slot.
pub const DEFAULT_SLOT_CAPACITY: i32 = 5;

/// Minutes between consecutive seeded slots.
pub const SLOT_INTERVAL_MINUTES: i64 = 30;

/// First seeded slot (inclusive).
pub const OPENING_TIME: (u32, u32) = (8, 0);

/// Closing time (exclusive); the last seeded slot starts one interval before.
pub const CLOSING_TIME: (u32, u32) = (17, 0);

/// A catalog entry as seen by the availability projector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTemplate {
    pub id: DbId,
    pub time_of_day: NaiveTime,
    pub capacity: i32,
    pub is_active: bool,
}

/// The times of day seeded into an empty catalog, in ascending order.
pub fn default_slot_times() -> Vec<NaiveTime> {
    let (open_h, open_m) = OPENING_TIME;
    let (close_h, close_m) = CLOSING_TIME;
    let (Some(mut t), Some(close)) = (
        NaiveTime::from_hms_opt(open_h, open_m, 0),
        NaiveTime::from_hms_opt(close_h, close_m, 0),
    ) else {
        return Vec::new();
    };

    let step = Duration::minutes(SLOT_INTERVAL_MINUTES);
    let mut times = Vec::new();
    while t < close {
        times.push(t);
        t += step;
    }
    times
}

/// Validate an admin capacity update.
pub fn validate_capacity(capacity: i32) -> Result<(), CoreError> {
    if capacity < 0 {
        return Err(CoreError::Validation(format!(
            "Capacity must be zero or greater, got {capacity}"
        )));
    }
    Ok(())
}

/// Collapse rows sharing a time of day into one entry per time.
///
/// Legacy data allowed duplicate times; the merged entry keeps the first
/// row's id together with the maximum capacity and the logical OR of the
/// active flags. Output is ordered by time of day.
pub fn dedupe_templates(rows: Vec<SlotTemplate>) -> Vec<SlotTemplate> {
    let mut sorted = rows;
    sorted.sort_by_key(|r| (r.time_of_day, r.id));

    let mut merged: Vec<SlotTemplate> = Vec::with_capacity(sorted.len());
    for row in sorted {
        match merged.last_mut() {
            Some(last) if last.time_of_day == row.time_of_day => {
                last.capacity = last.capacity.max(row.capacity);
                last.is_active = last.is_active || row.is_active;
            }
            _ => merged.push(row),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(id: DbId, time: NaiveTime, capacity: i32, is_active: bool) -> SlotTemplate {
        SlotTemplate {
            id,
            time_of_day: time,
            capacity,
            is_active,
        }
    }

    #[test]
    fn default_times_cover_business_hours_in_half_hours() {
        let times = default_slot_times();
        assert_eq!(times.len(), 18);
        assert_eq!(times.first(), Some(&t(8, 0)));
        assert_eq!(times[1], t(8, 30));
        assert_eq!(times.last(), Some(&t(16, 30)));
    }

    #[test]
    fn negative_capacity_rejected() {
        assert_matches!(validate_capacity(-1), Err(CoreError::Validation(_)));
        assert!(validate_capacity(0).is_ok());
        assert!(validate_capacity(12).is_ok());
    }

    #[test]
    fn dedupe_keeps_max_capacity_and_any_active() {
        let rows = vec![
            slot(3, t(9, 0), 2, false),
            slot(1, t(8, 0), 5, true),
            slot(7, t(9, 0), 6, true),
            slot(4, t(9, 0), 4, false),
        ];

        let merged = dedupe_templates(rows);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], slot(1, t(8, 0), 5, true));
        assert_eq!(merged[1], slot(3, t(9, 0), 6, true));
    }

    #[test]
    fn dedupe_orders_by_time() {
        let merged = dedupe_templates(vec![
            slot(1, t(11, 0), 5, true),
            slot(2, t(8, 30), 5, true),
            slot(3, t(10, 0), 5, true),
        ]);
        let times: Vec<_> = merged.iter().map(|s| s.time_of_day).collect();
        assert_eq!(times, vec![t(8, 30), t(10, 0), t(11, 0)]);
    }

    #[test]
    fn dedupe_of_empty_catalog_is_empty() {
        assert!(dedupe_templates(Vec::new()).is_empty());
    }
}
