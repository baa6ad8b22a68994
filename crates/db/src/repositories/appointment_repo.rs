//! Repository for the `appointment_bookings` ledger.
//!
//! Capacity is enforced inside Postgres: every write that can consume
//! capacity first takes a row lock on the `(slot_date, time_of_day)` anchor
//! in `appointment_slot_locks`, then counts confirmed bookings and inserts
//! or promotes within the same transaction. Concurrent writers for the same
//! key serialize on that lock, so the count they observe is the committed
//! one.

use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use tailor_core::appointment::initial_hold_state;
use tailor_core::types::DbId;

use crate::models::appointment::{
    AppointmentBooking, BookedCount, BookingOutcome, CreateBooking, PromotionOutcome,
};
use crate::models::status::{AppointmentStatus, HoldState};
use crate::repositories::{ShopScheduleRepo, TimeSlotRepo};

/// Column list for `appointment_bookings` queries.
const COLUMNS: &str = "id, service_type, slot_date, time_of_day, owner_id, order_item_id, \
    cart_item_id, status_id, hold_state_id, created_at, updated_at";

/// Provides data access for appointment bookings.
pub struct AppointmentRepo;

impl AppointmentRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AppointmentBooking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointment_bookings WHERE id = $1");
        sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all bookings owned by a user, most recent date first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<AppointmentBooking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointment_bookings \
             WHERE owner_id = $1 \
             ORDER BY slot_date DESC, time_of_day ASC, id ASC"
        );
        sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// The live (still `booked`) row created for a cart item, if any.
    pub async fn find_live_by_cart_item(
        pool: &PgPool,
        cart_item_id: DbId,
    ) -> Result<Option<AppointmentBooking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointment_bookings \
             WHERE cart_item_id = $1 AND status_id = $2"
        );
        sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(cart_item_id)
            .bind(AppointmentStatus::Booked.id())
            .fetch_optional(pool)
            .await
    }

    /// Every booking ever linked to an order item, in any status.
    pub async fn list_for_order_item(
        pool: &PgPool,
        order_item_id: DbId,
    ) -> Result<Vec<AppointmentBooking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointment_bookings \
             WHERE order_item_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(order_item_id)
            .fetch_all(pool)
            .await
    }

    /// Number of confirmed, booked rows for one `(date, time)`, across all
    /// service types.
    pub async fn booked_count<'e, E>(
        executor: E,
        slot_date: NaiveDate,
        time_of_day: NaiveTime,
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointment_bookings \
             WHERE slot_date = $1 AND time_of_day = $2 \
               AND status_id = $3 AND hold_state_id = $4",
        )
        .bind(slot_date)
        .bind(time_of_day)
        .bind(AppointmentStatus::Booked.id())
        .bind(HoldState::Confirmed.id())
        .fetch_one(executor)
        .await
    }

    /// Confirmed booking counts for every time of day on `slot_date`, in a
    /// single grouped query. Times with no bookings are absent.
    pub async fn booked_counts_for_date(
        pool: &PgPool,
        slot_date: NaiveDate,
    ) -> Result<Vec<BookedCount>, sqlx::Error> {
        sqlx::query_as::<_, BookedCount>(
            "SELECT time_of_day, COUNT(*) AS booked FROM appointment_bookings \
             WHERE slot_date = $1 AND status_id = $2 AND hold_state_id = $3 \
             GROUP BY time_of_day \
             ORDER BY time_of_day",
        )
        .bind(slot_date)
        .bind(AppointmentStatus::Booked.id())
        .bind(HoldState::Confirmed.id())
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Capacity-guarded writes
    // -----------------------------------------------------------------------

    /// Book a slot if the shop is open and confirmed bookings are below
    /// capacity, all under the per-slot lock.
    ///
    /// Soft holds (with a `cart_item_id`) are also refused once the slot is
    /// full, even though they do not count until promoted.
    pub async fn book_if_available(
        pool: &PgPool,
        input: &CreateBooking,
        lock_timeout_ms: u64,
    ) -> Result<BookingOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::set_lock_timeout(&mut tx, lock_timeout_ms).await?;

        if !ShopScheduleRepo::is_open(&mut *tx, input.slot_date).await? {
            return Ok(BookingOutcome::ShopClosed);
        }

        Self::lock_slot(&mut tx, input.slot_date, input.time_of_day).await?;

        let Some(template) = TimeSlotRepo::find_effective_by_time(&mut *tx, input.time_of_day).await?
        else {
            return Ok(BookingOutcome::UnknownSlot);
        };
        if !template.is_active {
            return Ok(BookingOutcome::InactiveSlot);
        }

        let booked = Self::booked_count(&mut *tx, input.slot_date, input.time_of_day).await?;
        if booked >= i64::from(template.capacity) {
            return Ok(BookingOutcome::Full {
                capacity: template.capacity,
                booked,
            });
        }

        let query = format!(
            "INSERT INTO appointment_bookings \
                (service_type, slot_date, time_of_day, owner_id, cart_item_id, status_id, hold_state_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(input.service_type.as_str())
            .bind(input.slot_date)
            .bind(input.time_of_day)
            .bind(input.owner_id)
            .bind(input.cart_item_id)
            .bind(AppointmentStatus::Booked.id())
            .bind(initial_hold_state(input.cart_item_id))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(BookingOutcome::Booked(booking))
    }

    /// Link the live soft hold for `cart_item_id` to `order_item_id`, making
    /// it count toward capacity.
    ///
    /// Re-checks capacity under the per-slot lock so promotion can never
    /// push a slot past its capacity.
    pub async fn promote_to_order_item(
        pool: &PgPool,
        cart_item_id: DbId,
        order_item_id: DbId,
        lock_timeout_ms: u64,
    ) -> Result<PromotionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::set_lock_timeout(&mut tx, lock_timeout_ms).await?;

        let query = format!(
            "SELECT {COLUMNS} FROM appointment_bookings \
             WHERE cart_item_id = $1 AND status_id = $2"
        );
        let Some(hold) = sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(cart_item_id)
            .bind(AppointmentStatus::Booked.id())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(PromotionOutcome::NoHold);
        };

        Self::lock_slot(&mut tx, hold.slot_date, hold.time_of_day).await?;

        // Re-read under the lock; a concurrent promotion or cancellation may
        // have committed while we waited.
        let query = format!(
            "SELECT {COLUMNS} FROM appointment_bookings WHERE id = $1 FOR UPDATE"
        );
        let current = sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(hold.id)
            .fetch_one(&mut *tx)
            .await?;

        if !current.is_booked() {
            return Ok(PromotionOutcome::NoHold);
        }
        if current.hold_state_id == HoldState::Confirmed.id() {
            return Ok(PromotionOutcome::AlreadyPromoted(current));
        }

        let template =
            TimeSlotRepo::find_effective_by_time(&mut *tx, current.time_of_day).await?;
        let Some(template) = template.filter(|t| t.is_active) else {
            return Ok(PromotionOutcome::InactiveSlot);
        };

        let booked = Self::booked_count(&mut *tx, current.slot_date, current.time_of_day).await?;
        if booked >= i64::from(template.capacity) {
            return Ok(PromotionOutcome::Full {
                capacity: template.capacity,
                booked,
            });
        }

        let query = format!(
            "UPDATE appointment_bookings \
             SET order_item_id = $2, hold_state_id = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let promoted = sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(current.id)
            .bind(order_item_id)
            .bind(HoldState::Confirmed.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PromotionOutcome::Promoted(promoted))
    }

    // -----------------------------------------------------------------------
    // Status transitions
    // -----------------------------------------------------------------------

    /// Move a booked row to `cancelled`.
    ///
    /// Returns `None` when the row does not exist or is no longer `booked`;
    /// the caller decides whether that is idempotent success or an error.
    /// Freed capacity is visible to the next read once this commits.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AppointmentBooking>, sqlx::Error> {
        let query = format!(
            "UPDATE appointment_bookings SET status_id = $2 \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(id)
            .bind(AppointmentStatus::Cancelled.id())
            .bind(AppointmentStatus::Booked.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark every booked row linked to `order_item_id` as `completed`.
    pub async fn complete_for_order_item(
        pool: &PgPool,
        order_item_id: DbId,
    ) -> Result<Vec<AppointmentBooking>, sqlx::Error> {
        let query = format!(
            "UPDATE appointment_bookings SET status_id = $2 \
             WHERE order_item_id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AppointmentBooking>(&query)
            .bind(order_item_id)
            .bind(AppointmentStatus::Completed.id())
            .bind(AppointmentStatus::Booked.id())
            .fetch_all(pool)
            .await
    }

    /// Delete lock anchors for dates before `today`. Returns the number of
    /// anchors removed.
    pub async fn prune_slot_locks_before(
        pool: &PgPool,
        today: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointment_slot_locks WHERE slot_date < $1")
            .bind(today)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Locking helpers
    // -----------------------------------------------------------------------

    /// Bound how long this transaction waits on row locks. Exceeding it
    /// raises SQLSTATE `55P03`.
    async fn set_lock_timeout(
        tx: &mut Transaction<'_, Postgres>,
        lock_timeout_ms: u64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{lock_timeout_ms}ms"))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Take the row lock for `(slot_date, time_of_day)`, creating the anchor
    /// row on first use. Held until the transaction ends.
    async fn lock_slot(
        tx: &mut Transaction<'_, Postgres>,
        slot_date: NaiveDate,
        time_of_day: NaiveTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO appointment_slot_locks (slot_date, time_of_day) VALUES ($1, $2) \
             ON CONFLICT (slot_date, time_of_day) DO NOTHING",
        )
        .bind(slot_date)
        .bind(time_of_day)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "SELECT 1 FROM appointment_slot_locks \
             WHERE slot_date = $1 AND time_of_day = $2 \
             FOR UPDATE",
        )
        .bind(slot_date)
        .bind(time_of_day)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
