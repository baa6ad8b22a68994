//! Integration tests for the booking ledger.
//!
//! Exercises the locking booking and promotion transactions against a real
//! database, including concurrent writers racing for the last opening.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use tailor_core::appointment::ServiceType;
use tailor_core::catalog::{default_slot_times, DEFAULT_SLOT_CAPACITY};
use tailor_db::models::appointment::{BookingOutcome, CreateBooking, PromotionOutcome};
use tailor_db::models::status::{AppointmentStatus, HoldState};
use tailor_db::repositories::{AppointmentRepo, TimeSlotRepo};

const LOCK_TIMEOUT_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn booking(service_type: ServiceType, owner_id: i64, cart_item_id: Option<i64>) -> CreateBooking {
    CreateBooking {
        service_type,
        slot_date: monday(),
        time_of_day: at(10, 0),
        owner_id,
        cart_item_id,
    }
}

async fn seed(pool: &PgPool) {
    TimeSlotRepo::seed_defaults(pool, &default_slot_times(), DEFAULT_SLOT_CAPACITY)
        .await
        .unwrap();
}

async fn set_capacity(pool: &PgPool, time: NaiveTime, capacity: i32, is_active: bool) {
    let slot = TimeSlotRepo::find_effective_by_time(pool, time)
        .await
        .unwrap()
        .expect("slot should be seeded");
    TimeSlotRepo::update_capacity(pool, slot.id, capacity, is_active)
        .await
        .unwrap()
        .expect("slot should exist");
}

async fn book(pool: &PgPool, input: &CreateBooking) -> BookingOutcome {
    AppointmentRepo::book_if_available(pool, input, LOCK_TIMEOUT_MS)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: booking and counting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_direct_booking_counts_toward_capacity(pool: PgPool) {
    seed(&pool).await;

    let outcome = book(&pool, &booking(ServiceType::Repair, 1, None)).await;
    let BookingOutcome::Booked(row) = outcome else {
        panic!("expected Booked, got {outcome:?}");
    };
    assert_eq!(row.service_type, "repair");
    assert_eq!(row.status_id, AppointmentStatus::Booked.id());
    assert_eq!(row.hold_state_id, HoldState::Confirmed.id());
    assert!(row.counts_toward_capacity());

    let count = AppointmentRepo::booked_count(&pool, monday(), at(10, 0))
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_capacity_is_pooled_across_service_types(pool: PgPool) {
    seed(&pool).await;

    book(&pool, &booking(ServiceType::Repair, 1, None)).await;
    book(&pool, &booking(ServiceType::DryCleaning, 2, None)).await;
    book(&pool, &booking(ServiceType::Customization, 3, None)).await;

    let counts = AppointmentRepo::booked_counts_for_date(&pool, monday())
        .await
        .unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].time_of_day, at(10, 0));
    assert_eq!(counts[0].booked, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_closed_day_is_rejected(pool: PgPool) {
    seed(&pool).await;

    let mut input = booking(ServiceType::Repair, 1, None);
    input.slot_date = sunday();

    assert!(matches!(book(&pool, &input).await, BookingOutcome::ShopClosed));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_and_inactive_slots_are_rejected(pool: PgPool) {
    seed(&pool).await;

    let mut input = booking(ServiceType::Repair, 1, None);
    input.time_of_day = at(10, 15);
    assert!(matches!(book(&pool, &input).await, BookingOutcome::UnknownSlot));

    set_capacity(&pool, at(10, 0), 5, false).await;
    let input = booking(ServiceType::Repair, 1, None);
    assert!(matches!(book(&pool, &input).await, BookingOutcome::InactiveSlot));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_slot_is_rejected(pool: PgPool) {
    seed(&pool).await;
    set_capacity(&pool, at(10, 0), 2, true).await;

    assert!(matches!(
        book(&pool, &booking(ServiceType::Repair, 1, None)).await,
        BookingOutcome::Booked(_)
    ));
    assert!(matches!(
        book(&pool, &booking(ServiceType::Repair, 2, None)).await,
        BookingOutcome::Booked(_)
    ));

    let outcome = book(&pool, &booking(ServiceType::Repair, 3, None)).await;
    assert!(
        matches!(outcome, BookingOutcome::Full { capacity: 2, booked: 2 }),
        "got {outcome:?}"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_owner_may_hold_several_seats(pool: PgPool) {
    seed(&pool).await;

    for cart_item_id in [501, 502] {
        let outcome = book(&pool, &booking(ServiceType::Repair, 7, Some(cart_item_id))).await;
        assert!(matches!(outcome, BookingOutcome::Booked(_)), "got {outcome:?}");
    }
    let outcome = book(&pool, &booking(ServiceType::Repair, 7, None)).await;
    assert!(matches!(outcome, BookingOutcome::Booked(_)), "got {outcome:?}");
    let outcome = book(&pool, &booking(ServiceType::Repair, 7, None)).await;
    assert!(matches!(outcome, BookingOutcome::Booked(_)), "got {outcome:?}");

    let count = AppointmentRepo::booked_count(&pool, monday(), at(10, 0))
        .await
        .unwrap();
    assert_eq!(count, 2, "only the direct bookings consume capacity");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_live_booking_for_cart_item_violates_unique_index(pool: PgPool) {
    seed(&pool).await;
    book(&pool, &booking(ServiceType::Repair, 1, Some(501))).await;

    let err = AppointmentRepo::book_if_available(
        &pool,
        &booking(ServiceType::Repair, 1, Some(501)),
        LOCK_TIMEOUT_MS,
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_appointment_bookings_cart_item"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_prune_slot_locks_keeps_today_and_later(pool: PgPool) {
    seed(&pool).await;
    book(&pool, &booking(ServiceType::Repair, 1, None)).await;
    let tuesday = CreateBooking {
        slot_date: monday().succ_opt().unwrap(),
        ..booking(ServiceType::Repair, 1, None)
    };
    book(&pool, &tuesday).await;

    let pruned = AppointmentRepo::prune_slot_locks_before(&pool, tuesday.slot_date)
        .await
        .unwrap();
    assert_eq!(pruned, 1);

    let remaining: Vec<NaiveDate> =
        sqlx::query_scalar("SELECT slot_date FROM appointment_slot_locks ORDER BY slot_date")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, vec![tuesday.slot_date]);

    // Bookings on a pruned date recreate their anchor.
    let outcome = book(&pool, &booking(ServiceType::Repair, 2, None)).await;
    assert!(matches!(outcome, BookingOutcome::Booked(_)), "got {outcome:?}");
}

// ---------------------------------------------------------------------------
// Test: cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_frees_capacity(pool: PgPool) {
    seed(&pool).await;
    set_capacity(&pool, at(10, 0), 1, true).await;

    let BookingOutcome::Booked(first) = book(&pool, &booking(ServiceType::Repair, 1, None)).await
    else {
        panic!("first booking should succeed");
    };
    assert!(matches!(
        book(&pool, &booking(ServiceType::Repair, 2, None)).await,
        BookingOutcome::Full { .. }
    ));

    let cancelled = AppointmentRepo::cancel(&pool, first.id).await.unwrap().unwrap();
    assert!(cancelled.is_cancelled());

    // Second cancel finds no booked row.
    assert!(AppointmentRepo::cancel(&pool, first.id).await.unwrap().is_none());

    assert_eq!(
        AppointmentRepo::booked_count(&pool, monday(), at(10, 0))
            .await
            .unwrap(),
        0
    );
    assert!(matches!(
        book(&pool, &booking(ServiceType::Repair, 2, None)).await,
        BookingOutcome::Booked(_)
    ));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lowering_capacity_keeps_existing_bookings(pool: PgPool) {
    seed(&pool).await;
    for owner in 1..=3 {
        book(&pool, &booking(ServiceType::Repair, owner, None)).await;
    }

    set_capacity(&pool, at(10, 0), 1, true).await;

    assert_eq!(
        AppointmentRepo::booked_count(&pool, monday(), at(10, 0))
            .await
            .unwrap(),
        3
    );
    assert_eq!(AppointmentRepo::list_for_owner(&pool, 2).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: cart holds and promotion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cart_hold_counts_only_after_promotion(pool: PgPool) {
    seed(&pool).await;

    let BookingOutcome::Booked(hold) =
        book(&pool, &booking(ServiceType::Customization, 1, Some(77))).await
    else {
        panic!("hold should be created");
    };
    assert_eq!(hold.hold_state_id, HoldState::Unconfirmed.id());
    assert_eq!(hold.cart_item_id, Some(77));
    assert_eq!(
        AppointmentRepo::booked_count(&pool, monday(), at(10, 0))
            .await
            .unwrap(),
        0
    );

    let outcome = AppointmentRepo::promote_to_order_item(&pool, 77, 501, LOCK_TIMEOUT_MS)
        .await
        .unwrap();
    let PromotionOutcome::Promoted(promoted) = outcome else {
        panic!("expected Promoted, got {outcome:?}");
    };
    assert_eq!(promoted.id, hold.id);
    assert_eq!(promoted.order_item_id, Some(501));
    assert_eq!(promoted.hold_state_id, HoldState::Confirmed.id());
    assert_eq!(
        AppointmentRepo::booked_count(&pool, monday(), at(10, 0))
            .await
            .unwrap(),
        1
    );

    let again = AppointmentRepo::promote_to_order_item(&pool, 77, 501, LOCK_TIMEOUT_MS)
        .await
        .unwrap();
    assert!(matches!(again, PromotionOutcome::AlreadyPromoted(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promotion_refused_when_slot_filled(pool: PgPool) {
    seed(&pool).await;
    set_capacity(&pool, at(10, 0), 1, true).await;

    book(&pool, &booking(ServiceType::Repair, 1, Some(10))).await;
    book(&pool, &booking(ServiceType::Repair, 2, None)).await;

    let outcome = AppointmentRepo::promote_to_order_item(&pool, 10, 900, LOCK_TIMEOUT_MS)
        .await
        .unwrap();
    assert!(matches!(outcome, PromotionOutcome::Full { capacity: 1, booked: 1 }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_promotion_without_hold(pool: PgPool) {
    seed(&pool).await;
    let outcome = AppointmentRepo::promote_to_order_item(&pool, 404, 1, LOCK_TIMEOUT_MS)
        .await
        .unwrap();
    assert!(matches!(outcome, PromotionOutcome::NoHold));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complete_for_order_item(pool: PgPool) {
    seed(&pool).await;
    book(&pool, &booking(ServiceType::Repair, 1, Some(5))).await;
    AppointmentRepo::promote_to_order_item(&pool, 5, 42, LOCK_TIMEOUT_MS)
        .await
        .unwrap();

    let completed = AppointmentRepo::complete_for_order_item(&pool, 42)
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].status_id, AppointmentStatus::Completed.id());

    // Completed rows free the slot and cannot be cancelled.
    assert_eq!(
        AppointmentRepo::booked_count(&pool, monday(), at(10, 0))
            .await
            .unwrap(),
        0
    );
    assert!(AppointmentRepo::cancel(&pool, completed[0].id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: concurrent writers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_bookings_never_oversell(pool: PgPool) {
    seed(&pool).await;
    set_capacity(&pool, at(10, 0), 1, true).await;

    let attempts = (1..=8).map(|owner| {
        let pool = pool.clone();
        tokio::spawn(async move {
            AppointmentRepo::book_if_available(
                &pool,
                &booking(ServiceType::Repair, owner, None),
                LOCK_TIMEOUT_MS,
            )
            .await
        })
    });
    let results = futures::future::join_all(attempts).await;

    let successes = results
        .into_iter()
        .map(|joined| joined.expect("task should not panic"))
        .filter(|r| matches!(r, Ok(BookingOutcome::Booked(_))))
        .count();
    assert_eq!(successes, 1);

    assert_eq!(
        AppointmentRepo::booked_count(&pool, monday(), at(10, 0))
            .await
            .unwrap(),
        1
    );
}
