//! Appointment booking ledger models and DTOs.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::FromRow;
use tailor_core::appointment::{hold_state_name, state_machine, ServiceType};
use tailor_core::types::{DbId, Timestamp};

use crate::models::status::{AppointmentStatus, HoldState};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `appointment_bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentBooking {
    pub id: DbId,
    pub service_type: String,
    pub slot_date: NaiveDate,
    pub time_of_day: NaiveTime,
    pub owner_id: DbId,
    pub order_item_id: Option<DbId>,
    pub cart_item_id: Option<DbId>,
    pub status_id: i16,
    pub hold_state_id: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AppointmentBooking {
    pub fn is_booked(&self) -> bool {
        self.status_id == AppointmentStatus::Booked.id()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status_id == AppointmentStatus::Cancelled.id()
    }

    /// Whether this row currently consumes slot capacity.
    pub fn counts_toward_capacity(&self) -> bool {
        self.is_booked() && self.hold_state_id == HoldState::Confirmed.id()
    }
}

/// Aggregate row: confirmed bookings per time of day on one date.
#[derive(Debug, Clone, FromRow)]
pub struct BookedCount {
    pub time_of_day: NaiveTime,
    pub booked: i64,
}

// ---------------------------------------------------------------------------
// API views
// ---------------------------------------------------------------------------

/// Booking as returned to clients, with lookup IDs resolved to names.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSummary {
    pub id: DbId,
    pub service_type: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub owner_id: DbId,
    pub order_item_id: Option<DbId>,
    pub cart_item_id: Option<DbId>,
    pub status: &'static str,
    pub hold_state: &'static str,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AppointmentBooking> for BookingSummary {
    fn from(b: AppointmentBooking) -> Self {
        Self {
            id: b.id,
            service_type: b.service_type,
            date: b.slot_date,
            time_slot: b.time_of_day.format("%H:%M:%S").to_string(),
            owner_id: b.owner_id,
            order_item_id: b.order_item_id,
            cart_item_id: b.cart_item_id,
            status: state_machine::status_name(b.status_id),
            hold_state: hold_state_name(b.hold_state_id),
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (repository inputs)
// ---------------------------------------------------------------------------

/// Validated input for inserting a booking.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub service_type: ServiceType,
    pub slot_date: NaiveDate,
    pub time_of_day: NaiveTime,
    pub owner_id: DbId,
    pub cart_item_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Transaction outcomes
// ---------------------------------------------------------------------------

/// Result of the locking booking transaction.
#[derive(Debug)]
pub enum BookingOutcome {
    Booked(AppointmentBooking),
    ShopClosed,
    /// No catalog entry exists for the requested time of day.
    UnknownSlot,
    /// The catalog entry exists but is disabled.
    InactiveSlot,
    Full { capacity: i32, booked: i64 },
}

/// Result of promoting a cart hold to an order item.
#[derive(Debug)]
pub enum PromotionOutcome {
    Promoted(AppointmentBooking),
    /// The hold was already linked to this order item.
    AlreadyPromoted(AppointmentBooking),
    /// No live booking exists for the cart item.
    NoHold,
    /// The slot was disabled while the hold was soft.
    InactiveSlot,
    Full { capacity: i32, booked: i64 },
}
