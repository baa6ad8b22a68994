//! Repository for the `time_slots` catalog table.

use chrono::NaiveTime;
use sqlx::{PgExecutor, PgPool};
use tailor_core::catalog::SlotTemplate;
use tailor_core::types::DbId;

use crate::models::time_slot::TimeSlot;

/// Column list for `time_slots` queries.
const COLUMNS: &str = "id, time_of_day, capacity, is_active, created_at, updated_at";

/// Provides data access for the slot catalog.
pub struct TimeSlotRepo;

impl TimeSlotRepo {
    /// List every catalog row ordered by time of day.
    ///
    /// Rows are returned as stored; legacy duplicates are not merged here.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<TimeSlot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM time_slots ORDER BY time_of_day, id");
        sqlx::query_as::<_, TimeSlot>(&query).fetch_all(pool).await
    }

    /// Resolve the effective template for one time of day.
    ///
    /// Duplicate rows collapse to the lowest id with the maximum capacity
    /// and any-active flag, matching `catalog::dedupe_templates`.
    pub async fn find_effective_by_time<'e, E>(
        executor: E,
        time_of_day: NaiveTime,
    ) -> Result<Option<SlotTemplate>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: Option<(DbId, NaiveTime, i32, bool)> = sqlx::query_as(
            "SELECT MIN(id), time_of_day, MAX(capacity), BOOL_OR(is_active) \
             FROM time_slots WHERE time_of_day = $1 \
             GROUP BY time_of_day",
        )
        .bind(time_of_day)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(|(id, time_of_day, capacity, is_active)| SlotTemplate {
            id,
            time_of_day,
            capacity,
            is_active,
        }))
    }

    /// Update capacity and active flag of one catalog row.
    ///
    /// Returns `None` if the id does not exist. Existing bookings are left
    /// untouched even when they now exceed the new capacity.
    pub async fn update_capacity(
        pool: &PgPool,
        id: DbId,
        capacity: i32,
        is_active: bool,
    ) -> Result<Option<TimeSlot>, sqlx::Error> {
        let query = format!(
            "UPDATE time_slots SET capacity = $2, is_active = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeSlot>(&query)
            .bind(id)
            .bind(capacity)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Insert the given times with `capacity`, skipping times already present.
    ///
    /// Returns the number of rows inserted, so a second call is a no-op.
    pub async fn seed_defaults(
        pool: &PgPool,
        times: &[NaiveTime],
        capacity: i32,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for &time in times {
            let result = sqlx::query(
                "INSERT INTO time_slots (time_of_day, capacity, is_active) \
                 SELECT $1, $2, true \
                 WHERE NOT EXISTS (SELECT 1 FROM time_slots WHERE time_of_day = $1) \
                 ON CONFLICT (time_of_day) DO NOTHING",
            )
            .bind(time)
            .bind(capacity)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        if inserted > 0 {
            tracing::info!(inserted, "Seeded default appointment time slots");
        }
        Ok(inserted)
    }
}
