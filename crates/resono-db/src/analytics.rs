//! Raw-data queries behind the analytics engine.
//!
//! These fetch rows; bucketing and percentage math live in
//! `resono-services::analytics::compute`, which keeps the numeric code
//! testable without a database.

use async_trait::async_trait;
use resono_core::models::CountryListeners;
use resono_core::AppError;
use sqlx::{PgPool, Row};

/// All-time raw inputs for per-track statistics.
#[derive(Debug, Clone, Default)]
pub struct TrackStatsRows {
    /// Hour-of-day (0..=23) of every listen event for the track.
    pub listen_hours: Vec<u32>,
    pub total_likes: i64,
    pub total_reposts: i64,
    /// Top 5 countries by raw listen count, descending.
    pub top_countries: Vec<String>,
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// `total_listen_time` of each listener's *first* listen of the track
    /// within the window. Anonymous events collapse into one pseudo-listener.
    async fn first_listen_times(&self, track_id: i64, months: u32) -> Result<Vec<i32>, AppError>;

    /// `end_time` of every listen part for the track within the window.
    async fn part_end_times(&self, track_id: i64, months: u32) -> Result<Vec<i32>, AppError>;

    /// Hour-of-day of each engagement event for the track within the window.
    async fn engagement_hours(&self, track_id: i64, months: u32) -> Result<Vec<u32>, AppError>;

    /// Distinct identified listeners per country within the window.
    async fn country_listener_counts(
        &self,
        track_id: i64,
        months: u32,
    ) -> Result<Vec<CountryListeners>, AppError>;

    /// All-time raw inputs for per-track statistics.
    async fn track_stats_rows(&self, track_id: i64) -> Result<TrackStatsRows, AppError>;

    /// Platform-wide (listens, likes, distinct listeners) for the last
    /// `days` days. Day-range validation happens in the service layer.
    async fn global_counts(&self, days: i64) -> Result<(i64, i64, i64), AppError>;
}

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsStore for AnalyticsRepository {
    async fn first_listen_times(&self, track_id: i64, months: u32) -> Result<Vec<i32>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (listener_id) total_listen_time
            FROM track_listens
            WHERE track_id = $1
              AND created_at >= NOW() - ($2 * INTERVAL '1 month')
            ORDER BY listener_id, created_at
            "#,
        )
        .bind(track_id)
        .bind(months as i32)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("total_listen_time").map_err(Into::into))
            .collect()
    }

    async fn part_end_times(&self, track_id: i64, months: u32) -> Result<Vec<i32>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT lp.end_time
            FROM listens_parts lp
            JOIN track_listens tl ON lp.listen_id = tl.id
            WHERE tl.track_id = $1
              AND tl.created_at >= NOW() - ($2 * INTERVAL '1 month')
            "#,
        )
        .bind(track_id)
        .bind(months as i32)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("end_time").map_err(Into::into))
            .collect()
    }

    // Engagement events are the likes on the track; this mirrors the
    // observed upstream behavior (see DESIGN.md).
    async fn engagement_hours(&self, track_id: i64, months: u32) -> Result<Vec<u32>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT EXTRACT(HOUR FROM created_at)::int AS hour
            FROM likes
            WHERE track_id = $1
              AND created_at >= NOW() - ($2 * INTERVAL '1 month')
            "#,
        )
        .bind(track_id)
        .bind(months as i32)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<i32, _>("hour")? as u32))
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(Into::into)
    }

    async fn country_listener_counts(
        &self,
        track_id: i64,
        months: u32,
    ) -> Result<Vec<CountryListeners>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT country, COUNT(DISTINCT listener_id) AS listeners
            FROM track_listens
            WHERE track_id = $1
              AND created_at >= NOW() - ($2 * INTERVAL '1 month')
            GROUP BY country
            "#,
        )
        .bind(track_id)
        .bind(months as i32)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CountryListeners {
                    country: row.try_get("country")?,
                    listeners: row.try_get("listeners")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(Into::into)
    }

    async fn track_stats_rows(&self, track_id: i64) -> Result<TrackStatsRows, AppError> {
        let hour_rows = sqlx::query(
            r#"
            SELECT EXTRACT(HOUR FROM created_at)::int AS hour
            FROM track_listens
            WHERE track_id = $1
            "#,
        )
        .bind(track_id)
        .fetch_all(&self.pool)
        .await?;

        let listen_hours = hour_rows
            .iter()
            .map(|row| Ok(row.try_get::<i32, _>("hour")? as u32))
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let counts = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM likes WHERE track_id = $1) AS total_likes,
                (SELECT COUNT(*) FROM reposts WHERE track_id = $1) AS total_reposts
            "#,
        )
        .bind(track_id)
        .fetch_one(&self.pool)
        .await?;

        let country_rows = sqlx::query(
            r#"
            SELECT country
            FROM track_listens
            WHERE track_id = $1
            GROUP BY country
            ORDER BY COUNT(*) DESC
            LIMIT 5
            "#,
        )
        .bind(track_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TrackStatsRows {
            listen_hours,
            total_likes: counts.try_get("total_likes")?,
            total_reposts: counts.try_get("total_reposts")?,
            top_countries: country_rows
                .iter()
                .map(|row| row.try_get("country"))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    async fn global_counts(&self, days: i64) -> Result<(i64, i64, i64), AppError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM track_listens
                 WHERE created_at >= NOW() - ($1 * INTERVAL '1 day')) AS listens,
                (SELECT COUNT(*) FROM likes
                 WHERE created_at >= NOW() - ($1 * INTERVAL '1 day')) AS likes,
                (SELECT COUNT(DISTINCT listener_id) FROM track_listens
                 WHERE created_at >= NOW() - ($1 * INTERVAL '1 day')) AS listeners
            "#,
        )
        .bind(days)
        .fetch_one(&self.pool)
        .await?;

        Ok((
            row.try_get("listens")?,
            row.try_get("likes")?,
            row.try_get("listeners")?,
        ))
    }
}
