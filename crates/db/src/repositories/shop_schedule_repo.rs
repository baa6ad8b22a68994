//! Repository for the `shop_schedule` table.

use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use tailor_core::calendar::day_of_week;

use crate::models::shop_schedule::ShopScheduleEntry;

const COLUMNS: &str = "day_of_week, is_open, created_at, updated_at";

/// Provides data access for the weekly open/closed pattern.
pub struct ShopScheduleRepo;

impl ShopScheduleRepo {
    /// List the weekly pattern ordered Sunday first.
    pub async fn list(pool: &PgPool) -> Result<Vec<ShopScheduleEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shop_schedule ORDER BY day_of_week");
        sqlx::query_as::<_, ShopScheduleEntry>(&query)
            .fetch_all(pool)
            .await
    }

    /// Whether the shop opens on `date`. Unconfigured days are closed.
    pub async fn is_open<'e, E>(executor: E, date: NaiveDate) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let open: Option<bool> =
            sqlx::query_scalar("SELECT is_open FROM shop_schedule WHERE day_of_week = $1")
                .bind(day_of_week(date))
                .fetch_optional(executor)
                .await?;
        Ok(open.unwrap_or(false))
    }

    /// Set the open flag for one day of the week, creating the row if absent.
    pub async fn upsert_day(
        pool: &PgPool,
        day_of_week: i16,
        is_open: bool,
    ) -> Result<ShopScheduleEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO shop_schedule (day_of_week, is_open) VALUES ($1, $2) \
             ON CONFLICT (day_of_week) DO UPDATE SET is_open = EXCLUDED.is_open \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShopScheduleEntry>(&query)
            .bind(day_of_week)
            .bind(is_open)
            .fetch_one(pool)
            .await
    }
}
