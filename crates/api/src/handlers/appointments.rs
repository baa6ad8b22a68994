//! Customer-facing appointment handlers.
//!
//! Availability reads are public. Booking, cancellation, promotion and
//! listing require an authenticated caller, who becomes the booking owner.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tailor_core::appointment::{parse_date, parse_time_of_day, require_param, ServiceType};
use tailor_core::error::CoreError;
use tailor_core::types::DbId;
use tailor_db::models::appointment::{BookingSummary, CreateBooking};
use tailor_db::repositories::AppointmentRepo;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAuth;
use crate::query::{AvailabilityParams, SlotCheckParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Body of `POST /appointments/book`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequest {
    pub service_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Present when the booking is made from the cart; the booking is then
    /// a soft hold until the order is placed.
    pub cart_item_id: Option<DbId>,
}

/// Body of `POST /appointments/promote`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    pub cart_item_id: DbId,
    pub order_item_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct SlotCheckResponse {
    pub available: bool,
}

// ---------------------------------------------------------------------------
// Parameter parsing
// ---------------------------------------------------------------------------

fn parse_service_type(raw: Option<&str>) -> Result<ServiceType, CoreError> {
    require_param(raw, "serviceType")?.parse()
}

fn parse_required_date(raw: Option<&str>) -> Result<NaiveDate, CoreError> {
    parse_date(require_param(raw, "date")?)
}

fn parse_required_time(raw: Option<&str>) -> Result<NaiveTime, CoreError> {
    parse_time_of_day(require_param(raw, "time")?)
}

fn validate_positive_id(id: DbId, name: &str) -> Result<(), CoreError> {
    if id <= 0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a positive integer"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public availability endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments/available?serviceType=&date=
///
/// Bookable times of day for a date as plain `HH:MM:SS` strings. Empty when
/// the shop is closed.
pub async fn list_open_times(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> AppResult<impl IntoResponse> {
    let service_type = parse_service_type(params.service_type.as_deref())?;
    let date = parse_required_date(params.date.as_deref())?;

    let times = state.availability().open_times(service_type, date).await?;

    Ok(Json(DataResponse { data: times }))
}

/// GET /api/v1/appointments/slots-with-availability?serviceType=&date=
///
/// Every slot on a date with its capacity status.
pub async fn slots_with_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> AppResult<impl IntoResponse> {
    let service_type = parse_service_type(params.service_type.as_deref())?;
    let date = parse_required_date(params.date.as_deref())?;

    let day = state
        .availability()
        .get_availability(service_type, date)
        .await?;

    Ok(Json(DataResponse { data: day }))
}

/// GET /api/v1/appointments/check?serviceType=&date=&time=
pub async fn check_slot(
    State(state): State<AppState>,
    Query(params): Query<SlotCheckParams>,
) -> AppResult<impl IntoResponse> {
    let service_type = parse_service_type(params.service_type.as_deref())?;
    let date = parse_required_date(params.date.as_deref())?;
    let time = parse_required_time(params.time.as_deref())?;

    let available = state
        .availability()
        .is_slot_available(service_type, date, time)
        .await?;

    Ok(Json(DataResponse {
        data: SlotCheckResponse { available },
    }))
}

// ---------------------------------------------------------------------------
// Authenticated endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/appointments/book
///
/// Book a slot for the caller. Returns 201 with the new booking.
pub async fn book_slot(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<BookSlotRequest>,
) -> AppResult<impl IntoResponse> {
    let service_type = parse_service_type(input.service_type.as_deref())?;
    let slot_date = parse_required_date(input.date.as_deref())?;
    let time_of_day = parse_required_time(input.time.as_deref())?;
    if let Some(cart_item_id) = input.cart_item_id {
        validate_positive_id(cart_item_id, "cartItemId")?;
    }

    let booking = state
        .booking_engine()
        .book_slot(&CreateBooking {
            service_type,
            slot_date,
            time_of_day,
            owner_id: user.user_id,
            cart_item_id: input.cart_item_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BookingSummary::from(booking),
        }),
    ))
}

/// DELETE /api/v1/appointments/cancel/{slot_id}
///
/// Cancel one of the caller's bookings (admins may cancel any).
pub async fn cancel_slot(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppPath(slot_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking = state.booking_engine().cancel_slot(slot_id, &user).await?;

    Ok(Json(DataResponse {
        data: BookingSummary::from(booking),
    }))
}

/// GET /api/v1/appointments/user-slots
///
/// All of the caller's bookings, newest date first.
pub async fn list_user_slots(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let bookings = AppointmentRepo::list_for_owner(&state.pool, user.user_id).await?;
    let data: Vec<BookingSummary> = bookings.into_iter().map(BookingSummary::from).collect();

    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/appointments/promote
///
/// Confirm a cart-stage hold once its order item exists.
pub async fn promote_hold(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<PromoteRequest>,
) -> AppResult<impl IntoResponse> {
    validate_positive_id(input.cart_item_id, "cartItemId")?;
    validate_positive_id(input.order_item_id, "orderItemId")?;

    let booking = state
        .booking_engine()
        .promote_to_order_item(input.cart_item_id, input.order_item_id, &user)
        .await?;

    Ok(Json(DataResponse {
        data: BookingSummary::from(booking),
    }))
}

/// GET /api/v1/appointments/{id}
pub async fn get_booking(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking = state.booking_engine().get_booking(id, &user).await?;

    Ok(Json(DataResponse {
        data: BookingSummary::from(booking),
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_service_type_names_the_field() {
        assert_matches!(
            parse_service_type(None),
            Err(CoreError::Validation(msg)) if msg == "serviceType is required"
        );
    }

    #[test]
    fn unknown_service_type_is_rejected() {
        assert_matches!(
            parse_service_type(Some("ironing")),
            Err(CoreError::Validation(_))
        );
        assert_eq!(
            parse_service_type(Some("dry_cleaning")).unwrap(),
            ServiceType::DryCleaning
        );
    }

    #[test]
    fn blank_date_is_missing() {
        assert_matches!(
            parse_required_date(Some("  ")),
            Err(CoreError::Validation(msg)) if msg == "date is required"
        );
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(validate_positive_id(1, "cartItemId").is_ok());
        assert_matches!(
            validate_positive_id(0, "cartItemId"),
            Err(CoreError::Validation(_))
        );
    }
}
