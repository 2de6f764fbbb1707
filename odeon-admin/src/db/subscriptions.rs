//! Subscription membership counts
//!
//! Subscriptions are never mutated here; the only projection is a
//! point-in-time membership count per trailing calendar month.

use anyhow::Result;
use chrono::{Months, NaiveDate};
use sqlx::SqlitePool;

/// Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so lexicographic
/// comparison matches chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-month membership counts, oldest bucket first
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonthlyCounts {
    /// Bucket labels, `YYYY-MM`
    pub dates: Vec<String>,
    pub counts: Vec<i64>,
}

/// Count subscriptions whose [start, end] interval covers the reference
/// instant (endpoints inclusive)
pub async fn count_active_at(pool: &SqlitePool, instant: &str) -> Result<i64> {
    let count = sqlx::query_scalar(
        "SELECT COUNT(*) FROM subscriptions WHERE start_at <= ? AND end_at >= ?",
    )
    .bind(instant)
    .bind(instant)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Membership counts for the trailing 12 calendar months, most recent last
///
/// Each bucket's reference instant is its date at midnight; the twelve
/// counts are independent point-in-time membership checks.
pub async fn monthly_counts(pool: &SqlitePool, today: NaiveDate) -> Result<MonthlyCounts> {
    let mut dates = Vec::with_capacity(12);
    let mut counts = Vec::with_capacity(12);

    for months_back in (0..12).rev() {
        let bucket = today
            .checked_sub_months(Months::new(months_back))
            .unwrap_or(today);
        let reference = bucket
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .format(TIMESTAMP_FORMAT)
            .to_string();

        counts.push(count_active_at(pool, &reference).await?);
        dates.push(bucket.format("%Y-%m").to_string());
    }

    Ok(MonthlyCounts { dates, counts })
}

/// Insert a subscription (test seeding helper)
pub async fn insert_subscription(
    pool: &SqlitePool,
    user_id: &str,
    start_at: &str,
    end_at: &str,
) -> Result<()> {
    sqlx::query("INSERT INTO subscriptions (user_id, start_at, end_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(start_at)
        .bind(end_at)
        .execute(pool)
        .await?;
    Ok(())
}
