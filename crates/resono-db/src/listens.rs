//! Listen telemetry repository: append-only events and their parts.

use async_trait::async_trait;
use resono_core::models::NewListen;
use resono_core::AppError;
use sqlx::{PgPool, Row};

/// Telemetry writes and the listening-history reads built on them.
#[async_trait]
pub trait ListenStore: Send + Sync {
    /// Persist a listen event together with all of its parts in one
    /// transaction, so an event never exists with half its parts.
    async fn add_listen(&self, listen: &NewListen) -> Result<i64, AppError>;

    /// Total number of listen events for a track, all-time.
    async fn listen_count(&self, track_id: i64) -> Result<i64, AppError>;

    /// Per-track listen counts for one listener within the last
    /// `window_days` days, ordered by count descending.
    async fn listener_track_counts(
        &self,
        listener_id: i64,
        window_days: i64,
    ) -> Result<Vec<(i64, i64)>, AppError>;

    /// Ids of the tracks a listener played most recently, newest first.
    async fn recent_track_ids(&self, listener_id: i64, limit: i64) -> Result<Vec<i64>, AppError>;
}

#[derive(Clone)]
pub struct ListenRepository {
    pool: PgPool,
}

impl ListenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListenStore for ListenRepository {
    #[tracing::instrument(skip(self, listen), fields(track_id = %listen.track_id))]
    async fn add_listen(&self, listen: &NewListen) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO track_listens (listener_id, track_id, country, device, total_listen_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(listen.listener.as_db())
        .bind(listen.track_id)
        .bind(&listen.country)
        .bind(&listen.device)
        .bind(listen.total_listen_time)
        .fetch_one(&mut *tx)
        .await?;
        let listen_id: i64 = row.try_get("id")?;

        for part in &listen.parts {
            sqlx::query(
                r#"
                INSERT INTO listens_parts (listen_id, start_time, end_time)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(listen_id)
            .bind(part.start_time)
            .bind(part.end_time)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(listen_id)
    }

    async fn listen_count(&self, track_id: i64) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM track_listens WHERE track_id = $1")
            .bind(track_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn listener_track_counts(
        &self,
        listener_id: i64,
        window_days: i64,
    ) -> Result<Vec<(i64, i64)>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT track_id, COUNT(*) AS listen_count
            FROM track_listens
            WHERE listener_id = $1
              AND created_at >= NOW() - ($2 * INTERVAL '1 day')
            GROUP BY track_id
            ORDER BY listen_count DESC
            "#,
        )
        .bind(listener_id)
        .bind(window_days)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok((row.try_get("track_id")?, row.try_get("listen_count")?)))
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(Into::into)
    }

    async fn recent_track_ids(&self, listener_id: i64, limit: i64) -> Result<Vec<i64>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT track_id
            FROM track_listens
            WHERE listener_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(listener_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("track_id").map_err(Into::into))
            .collect()
    }
}
