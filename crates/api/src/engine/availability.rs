//! Availability projector.
//!
//! Reads catalog, calendar and ledger for one date. Every call issues a
//! fixed number of queries regardless of how many slots exist.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tailor_core::appointment::ServiceType;
use tailor_core::availability::{project_slots, DayAvailability};
use tailor_core::catalog::{dedupe_templates, SlotTemplate};
use tailor_core::types::DbId;
use tailor_db::repositories::{AppointmentRepo, ShopScheduleRepo, TimeSlotRepo};
use tailor_db::DbPool;

use crate::error::{AppError, AppResult};

/// Raw per-slot counts for the admin availability view.
#[derive(Debug, Serialize)]
pub struct SlotUsage {
    pub slot_id: DbId,
    pub time_slot: String,
    pub capacity: i32,
    pub booked: i64,
    /// `capacity - booked`; negative when capacity was lowered below
    /// existing bookings.
    pub available: i64,
    pub is_active: bool,
}

/// Admin view of one date.
#[derive(Debug, Serialize)]
pub struct DayUsage {
    pub date: NaiveDate,
    pub is_shop_open: bool,
    pub slots: Vec<SlotUsage>,
}

/// Read-only view over the slot catalog, the weekly calendar and the
/// booking ledger.
pub struct AvailabilityProjector<'a> {
    pool: &'a DbPool,
}

impl<'a> AvailabilityProjector<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Catalog templates ordered by time of day, duplicates merged.
    pub async fn list_templates(&self) -> AppResult<Vec<SlotTemplate>> {
        let rows = TimeSlotRepo::list_all(self.pool)
            .await
            .map_err(|e| storage_error(e, "list_templates"))?;
        Ok(dedupe_templates(
            rows.iter().map(|r| r.to_template()).collect(),
        ))
    }

    /// Per-slot status for `date`.
    ///
    /// Capacity is shared by every service type, so `service_type` is
    /// validated by the caller but does not filter the counts.
    pub async fn get_availability(
        &self,
        service_type: ServiceType,
        date: NaiveDate,
    ) -> AppResult<DayAvailability> {
        let is_open = ShopScheduleRepo::is_open(self.pool, date)
            .await
            .map_err(|e| storage_error(e, "get_availability"))?;
        if !is_open {
            tracing::debug!(%date, %service_type, "Availability requested for closed day");
            return Ok(DayAvailability::closed());
        }

        let templates = self.list_templates().await?;
        let booked = self.booked_by_time(date).await?;

        Ok(DayAvailability {
            is_shop_open: true,
            slots: project_slots(&templates, &booked),
        })
    }

    /// Whether one slot can still be booked. An unknown time is simply not
    /// available.
    pub async fn is_slot_available(
        &self,
        service_type: ServiceType,
        date: NaiveDate,
        time_of_day: NaiveTime,
    ) -> AppResult<bool> {
        let is_open = ShopScheduleRepo::is_open(self.pool, date)
            .await
            .map_err(|e| storage_error(e, "is_slot_available"))?;
        if !is_open {
            return Ok(false);
        }

        let Some(template) = TimeSlotRepo::find_effective_by_time(self.pool, time_of_day)
            .await
            .map_err(|e| storage_error(e, "is_slot_available"))?
        else {
            tracing::debug!(%service_type, %time_of_day, "No slot template for requested time");
            return Ok(false);
        };
        if !template.is_active {
            return Ok(false);
        }

        let booked = AppointmentRepo::booked_count(self.pool, date, time_of_day)
            .await
            .map_err(|e| storage_error(e, "is_slot_available"))?;
        Ok(booked < i64::from(template.capacity))
    }

    /// Times of day still bookable on `date`, as `HH:MM:SS` strings.
    pub async fn open_times(
        &self,
        service_type: ServiceType,
        date: NaiveDate,
    ) -> AppResult<Vec<String>> {
        let day = self.get_availability(service_type, date).await?;
        Ok(day
            .slots
            .into_iter()
            .filter(|s| s.is_clickable)
            .map(|s| s.time_slot)
            .collect())
    }

    /// Raw booked/available counts for every template on `date`, shown even
    /// when the shop is closed.
    pub async fn slot_usage(&self, date: NaiveDate) -> AppResult<DayUsage> {
        let is_shop_open = ShopScheduleRepo::is_open(self.pool, date)
            .await
            .map_err(|e| storage_error(e, "slot_usage"))?;
        let templates = self.list_templates().await?;
        let booked = self.booked_by_time(date).await?;

        let slots = templates
            .iter()
            .map(|t| {
                let count = booked.get(&t.time_of_day).copied().unwrap_or(0);
                SlotUsage {
                    slot_id: t.id,
                    time_slot: t.time_of_day.format("%H:%M:%S").to_string(),
                    capacity: t.capacity,
                    booked: count,
                    available: i64::from(t.capacity) - count,
                    is_active: t.is_active,
                }
            })
            .collect();

        Ok(DayUsage {
            date,
            is_shop_open,
            slots,
        })
    }

    async fn booked_by_time(&self, date: NaiveDate) -> AppResult<HashMap<NaiveTime, i64>> {
        let counts = AppointmentRepo::booked_counts_for_date(self.pool, date)
            .await
            .map_err(|e| storage_error(e, "booked_counts_for_date"))?;
        Ok(counts.into_iter().map(|c| (c.time_of_day, c.booked)).collect())
    }
}

fn storage_error(err: sqlx::Error, operation: &'static str) -> AppError {
    tracing::error!(operation, error = %err, "Availability storage error");
    AppError::Database(err)
}
