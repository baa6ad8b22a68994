//! Admin handlers for the slot catalog, weekly schedule and order-driven
//! completion. All require the `admin` role.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tailor_core::appointment::{parse_date, require_param};
use tailor_core::calendar::{day_name, validate_day_of_week};
use tailor_core::catalog::validate_capacity;
use tailor_core::error::CoreError;
use tailor_core::types::DbId;
use tailor_db::models::appointment::BookingSummary;
use tailor_db::models::shop_schedule::{ShopScheduleEntry, UpdateScheduleDay};
use tailor_db::models::time_slot::UpdateTimeSlot;
use tailor_db::repositories::{ShopScheduleRepo, TimeSlotRepo};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::query::DateParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// One day of the weekly schedule with its name.
#[derive(Debug, Serialize)]
pub struct ScheduleDayView {
    pub day_of_week: i16,
    pub day_name: &'static str,
    pub is_open: bool,
}

impl From<ShopScheduleEntry> for ScheduleDayView {
    fn from(entry: ShopScheduleEntry) -> Self {
        Self {
            day_of_week: entry.day_of_week,
            day_name: day_name(entry.day_of_week),
            is_open: entry.is_open,
        }
    }
}

// ---------------------------------------------------------------------------
// Slot catalog
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments/admin/time-slots
///
/// Every catalog row, including inactive and duplicate ones.
pub async fn list_time_slots(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let slots = TimeSlotRepo::list_all(&state.pool).await?;

    Ok(Json(DataResponse { data: slots }))
}

/// PUT /api/v1/appointments/admin/time-slots/update
///
/// Change a slot's capacity and active flag. Existing bookings are kept
/// even if they now exceed the capacity.
pub async fn update_time_slot(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<UpdateTimeSlot>,
) -> AppResult<impl IntoResponse> {
    validate_capacity(input.capacity)?;

    let slot =
        TimeSlotRepo::update_capacity(&state.pool, input.slot_id, input.capacity, input.is_active)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "TimeSlot",
                id: input.slot_id,
            })?;

    tracing::info!(
        slot_id = slot.id,
        time_of_day = %slot.time_of_day,
        capacity = slot.capacity,
        is_active = slot.is_active,
        admin_id = admin.user_id,
        "Time slot updated",
    );

    Ok(Json(DataResponse { data: slot }))
}

/// GET /api/v1/appointments/admin/availability?date=
///
/// Raw booked and available counts per slot for a date.
pub async fn slot_usage(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> AppResult<impl IntoResponse> {
    let date = parse_date(require_param(params.date.as_deref(), "date")?)?;

    let usage = state.availability().slot_usage(date).await?;

    Ok(Json(DataResponse { data: usage }))
}

// ---------------------------------------------------------------------------
// Weekly schedule
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments/admin/schedule
pub async fn get_schedule(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let week = ShopScheduleRepo::list(&state.pool).await?;
    let data: Vec<ScheduleDayView> = week.into_iter().map(ScheduleDayView::from).collect();

    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/appointments/admin/schedule/{day_of_week}
///
/// Open or close the shop on one day of the week. Existing bookings on
/// that day are kept.
pub async fn update_schedule_day(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(day_of_week): AppPath<i16>,
    AppJson(input): AppJson<UpdateScheduleDay>,
) -> AppResult<impl IntoResponse> {
    validate_day_of_week(day_of_week)?;

    let entry = ShopScheduleRepo::upsert_day(&state.pool, day_of_week, input.is_open).await?;

    tracing::info!(
        day_of_week,
        is_open = entry.is_open,
        admin_id = admin.user_id,
        "Shop schedule updated",
    );

    Ok(Json(DataResponse {
        data: ScheduleDayView::from(entry),
    }))
}

// ---------------------------------------------------------------------------
// Order lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/appointments/admin/complete/{order_item_id}
///
/// Called when an order item is fulfilled; completes its appointments.
pub async fn complete_order_item(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(order_item_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let completed = state
        .booking_engine()
        .complete_order_item(order_item_id, &admin)
        .await?;
    let data: Vec<BookingSummary> = completed.into_iter().map(BookingSummary::from).collect();

    Ok(Json(DataResponse { data }))
}
