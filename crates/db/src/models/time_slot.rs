//! Time slot catalog models and DTOs.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tailor_core::catalog::SlotTemplate;
use tailor_core::types::{DbId, Timestamp};

/// A row from the `time_slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeSlot {
    pub id: DbId,
    pub time_of_day: NaiveTime,
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TimeSlot {
    pub fn to_template(&self) -> SlotTemplate {
        SlotTemplate {
            id: self.id,
            time_of_day: self.time_of_day,
            capacity: self.capacity,
            is_active: self.is_active,
        }
    }
}

/// DTO for `PUT /appointments/admin/time-slots/update`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeSlot {
    pub slot_id: DbId,
    pub capacity: i32,
    pub is_active: bool,
}
