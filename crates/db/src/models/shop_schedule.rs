//! Weekly shop schedule models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tailor_core::types::Timestamp;

/// A row from the `shop_schedule` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShopScheduleEntry {
    pub day_of_week: i16,
    pub is_open: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `PUT /appointments/admin/schedule/{day_of_week}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleDay {
    pub is_open: bool,
}
