//! Booking engine: book, cancel, promote and complete appointments.
//!
//! Capacity checks run inside the locking transactions of
//! [`AppointmentRepo`]; this layer maps their outcomes to domain errors,
//! applies ownership rules, and publishes lifecycle events after commit.

use serde_json::json;
use tailor_core::appointment::{state_machine, STATUS_CANCELLED, STATUS_COMPLETED};
use tailor_core::error::CoreError;
use tailor_core::types::DbId;
use tailor_db::models::appointment::{
    AppointmentBooking, BookingOutcome, CreateBooking, PromotionOutcome,
};
use tailor_db::repositories::AppointmentRepo;
use tailor_db::DbPool;
use tailor_events::bus::{
    APPOINTMENT_BOOKED, APPOINTMENT_CANCELLED, APPOINTMENT_COMPLETED, APPOINTMENT_CONFIRMED,
};
use tailor_events::{AppointmentEvent, EventBus};

use crate::error::{is_duplicate_cart_hold, is_slot_conflict, AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Writes to the booking ledger for one request.
pub struct BookingEngine<'a> {
    pool: &'a DbPool,
    event_bus: &'a EventBus,
    lock_timeout_ms: u64,
}

impl<'a> BookingEngine<'a> {
    pub fn new(pool: &'a DbPool, event_bus: &'a EventBus, lock_timeout_ms: u64) -> Self {
        Self {
            pool,
            event_bus,
            lock_timeout_ms,
        }
    }

    // -----------------------------------------------------------------------
    // Booking
    // -----------------------------------------------------------------------

    /// Book a slot for `input.owner_id`.
    ///
    /// Without a `cart_item_id` the booking is confirmed immediately and
    /// consumes capacity. With one it is a soft hold until promoted.
    pub async fn book_slot(&self, input: &CreateBooking) -> AppResult<AppointmentBooking> {
        let outcome = AppointmentRepo::book_if_available(self.pool, input, self.lock_timeout_ms)
            .await
            .map_err(|e| {
                storage_error(
                    e,
                    "book_slot",
                    "Another booking for this slot was committed first; please retry",
                )
            })?;

        let date = input.slot_date;
        let time = input.time_of_day.format("%H:%M");
        let booking = match outcome {
            BookingOutcome::Booked(booking) => booking,
            BookingOutcome::ShopClosed => {
                return Err(CoreError::ShopClosed(format!("The shop is closed on {date}")).into());
            }
            BookingOutcome::UnknownSlot => {
                return Err(CoreError::SlotFull(format!(
                    "No appointment slot is offered at {time}"
                ))
                .into());
            }
            BookingOutcome::InactiveSlot => {
                return Err(CoreError::SlotFull(format!(
                    "The {time} slot on {date} is not currently available"
                ))
                .into());
            }
            BookingOutcome::Full { capacity, booked } => {
                tracing::debug!(%date, %time, capacity, booked, "Booking refused, slot full");
                return Err(CoreError::SlotFull(format!(
                    "The {time} slot on {date} is fully booked"
                ))
                .into());
            }
        };

        tracing::info!(
            booking_id = booking.id,
            owner_id = booking.owner_id,
            service_type = %booking.service_type,
            slot_date = %booking.slot_date,
            time_of_day = %booking.time_of_day,
            cart_item_id = ?booking.cart_item_id,
            "Appointment booked",
        );

        self.event_bus.publish(
            AppointmentEvent::new(APPOINTMENT_BOOKED, booking.id, booking.owner_id)
                .with_actor(booking.owner_id)
                .with_payload(json!({
                    "service_type": booking.service_type,
                    "date": booking.slot_date,
                    "time_slot": booking.time_of_day.format("%H:%M:%S").to_string(),
                    "confirmed": booking.counts_toward_capacity(),
                })),
        );

        Ok(booking)
    }

    // -----------------------------------------------------------------------
    // Cancellation
    // -----------------------------------------------------------------------

    /// Cancel a booking. Only its owner or an admin may do so.
    ///
    /// Cancelling an already-cancelled booking succeeds without change.
    /// Completed bookings cannot be cancelled.
    pub async fn cancel_slot(&self, id: DbId, actor: &AuthUser) -> AppResult<AppointmentBooking> {
        let existing = self.require_booking(id).await?;
        actor.ensure_owner_or_admin(existing.owner_id, "cancel")?;

        if existing.is_cancelled() {
            return Ok(existing);
        }
        state_machine::validate_transition(existing.status_id, STATUS_CANCELLED)
            .map_err(CoreError::Conflict)?;

        let Some(cancelled) = AppointmentRepo::cancel(self.pool, id)
            .await
            .map_err(|e| log_storage_error(e, "cancel_slot"))?
        else {
            // Lost a race with another status change; report the final state.
            let current = self.require_booking(id).await?;
            if current.is_cancelled() {
                return Ok(current);
            }
            return Err(CoreError::Conflict(format!(
                "Appointment {id} is {} and can no longer be cancelled",
                state_machine::status_name(current.status_id)
            ))
            .into());
        };

        tracing::info!(
            booking_id = cancelled.id,
            owner_id = cancelled.owner_id,
            actor_user_id = actor.user_id,
            slot_date = %cancelled.slot_date,
            time_of_day = %cancelled.time_of_day,
            "Appointment cancelled",
        );

        self.event_bus.publish(
            AppointmentEvent::new(APPOINTMENT_CANCELLED, cancelled.id, cancelled.owner_id)
                .with_actor(actor.user_id),
        );

        Ok(cancelled)
    }

    // -----------------------------------------------------------------------
    // Promotion
    // -----------------------------------------------------------------------

    /// Link the soft hold for `cart_item_id` to `order_item_id`, after which
    /// it consumes capacity.
    ///
    /// Repeating the call with the same order item is a no-op. The hold's
    /// owner or an admin may promote it.
    pub async fn promote_to_order_item(
        &self,
        cart_item_id: DbId,
        order_item_id: DbId,
        actor: &AuthUser,
    ) -> AppResult<AppointmentBooking> {
        let hold = AppointmentRepo::find_live_by_cart_item(self.pool, cart_item_id)
            .await
            .map_err(|e| log_storage_error(e, "promote_to_order_item"))?
            .ok_or(CoreError::NotFound {
                entity: "Appointment hold for cart item",
                id: cart_item_id,
            })?;
        actor.ensure_owner_or_admin(hold.owner_id, "confirm")?;

        let outcome = AppointmentRepo::promote_to_order_item(
            self.pool,
            cart_item_id,
            order_item_id,
            self.lock_timeout_ms,
        )
        .await
        .map_err(|e| {
            storage_error(
                e,
                "promote_to_order_item",
                "The slot was modified concurrently; please retry",
            )
        })?;

        let promoted = match outcome {
            PromotionOutcome::Promoted(booking) => booking,
            PromotionOutcome::AlreadyPromoted(booking) => {
                if booking.order_item_id == Some(order_item_id) {
                    return Ok(booking);
                }
                return Err(CoreError::Conflict(format!(
                    "Cart item {cart_item_id} is already linked to another order item"
                ))
                .into());
            }
            PromotionOutcome::NoHold => {
                return Err(CoreError::NotFound {
                    entity: "Appointment hold for cart item",
                    id: cart_item_id,
                }
                .into());
            }
            PromotionOutcome::InactiveSlot => {
                return Err(CoreError::SlotFull(format!(
                    "The {} slot on {} is no longer offered",
                    hold.time_of_day.format("%H:%M"),
                    hold.slot_date
                ))
                .into());
            }
            PromotionOutcome::Full { capacity, booked } => {
                tracing::debug!(cart_item_id, capacity, booked, "Promotion refused, slot full");
                return Err(CoreError::SlotFull(format!(
                    "The {} slot on {} filled up before the order was placed",
                    hold.time_of_day.format("%H:%M"),
                    hold.slot_date
                ))
                .into());
            }
        };

        tracing::info!(
            booking_id = promoted.id,
            cart_item_id,
            order_item_id,
            owner_id = promoted.owner_id,
            "Appointment hold confirmed",
        );

        self.event_bus.publish(
            AppointmentEvent::new(APPOINTMENT_CONFIRMED, promoted.id, promoted.owner_id)
                .with_actor(actor.user_id)
                .with_payload(json!({
                    "cart_item_id": cart_item_id,
                    "order_item_id": order_item_id,
                })),
        );

        Ok(promoted)
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// Complete every booked appointment linked to `order_item_id`.
    ///
    /// Succeeds with an empty list when all linked appointments are already
    /// completed. Fails with `NotFound` when nothing is linked, and with
    /// `Conflict` when the only linked appointments were cancelled.
    pub async fn complete_order_item(
        &self,
        order_item_id: DbId,
        actor: &AuthUser,
    ) -> AppResult<Vec<AppointmentBooking>> {
        let completed = AppointmentRepo::complete_for_order_item(self.pool, order_item_id)
            .await
            .map_err(|e| log_storage_error(e, "complete_order_item"))?;

        if completed.is_empty() {
            let linked = AppointmentRepo::list_for_order_item(self.pool, order_item_id)
                .await
                .map_err(|e| log_storage_error(e, "complete_order_item"))?;
            if linked.is_empty() {
                return Err(CoreError::NotFound {
                    entity: "Appointment for order item",
                    id: order_item_id,
                }
                .into());
            }
            if !linked.iter().any(|b| b.status_id == STATUS_COMPLETED) {
                return Err(CoreError::Conflict(format!(
                    "Appointments for order item {order_item_id} were cancelled"
                ))
                .into());
            }
            return Ok(completed);
        }

        for booking in &completed {
            tracing::info!(
                booking_id = booking.id,
                order_item_id,
                owner_id = booking.owner_id,
                "Appointment completed",
            );
            self.event_bus.publish(
                AppointmentEvent::new(APPOINTMENT_COMPLETED, booking.id, booking.owner_id)
                    .with_actor(actor.user_id)
                    .with_payload(json!({ "order_item_id": order_item_id })),
            );
        }

        Ok(completed)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Fetch a booking the caller owns (or any booking, for admins).
    pub async fn get_booking(&self, id: DbId, actor: &AuthUser) -> AppResult<AppointmentBooking> {
        let booking = self.require_booking(id).await?;
        actor.ensure_owner_or_admin(booking.owner_id, "view")?;
        Ok(booking)
    }

    async fn require_booking(&self, id: DbId) -> AppResult<AppointmentBooking> {
        AppointmentRepo::find_by_id(self.pool, id)
            .await
            .map_err(|e| log_storage_error(e, "find_booking"))?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Appointment",
                    id,
                }
                .into()
            })
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Map a storage error from a capacity-guarded transaction: a second live
/// booking for one cart item is a `Conflict`, a lost race becomes
/// `SlotConflict`, anything else is logged and surfaced as a 500.
fn storage_error(err: sqlx::Error, operation: &'static str, conflict_msg: &str) -> AppError {
    if is_duplicate_cart_hold(&err) {
        tracing::info!(operation, "Cart item already holds a live booking");
        return CoreError::Conflict("This cart item already holds an appointment".into()).into();
    }
    if is_slot_conflict(&err) {
        tracing::warn!(operation, error = %err, "Slot write lost a concurrent race");
        return CoreError::SlotConflict(conflict_msg.to_string()).into();
    }
    log_storage_error(err, operation)
}

fn log_storage_error(err: sqlx::Error, operation: &'static str) -> AppError {
    tracing::error!(operation, error = %err, "Appointment storage error");
    AppError::Database(err)
}
