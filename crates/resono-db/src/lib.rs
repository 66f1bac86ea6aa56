//! Postgres repositories for tracks, playback telemetry and analytics.
//!
//! Each repository is a thin struct over a [`PgPool`] implementing an
//! `async_trait` store trait, so the service layer can run against fakes.
//! Queries use runtime binding (no compile-time macros) and map rows by
//! column name.

pub mod analytics;
pub mod listens;
pub mod tracks;

pub use analytics::{AnalyticsRepository, AnalyticsStore, TrackStatsRows};
pub use listens::{ListenRepository, ListenStore};
pub use tracks::{TrackRepository, TrackStore};

use resono_core::{AppError, ServiceConfig};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect a pool and run pending migrations.
pub async fn connect_pool(config: &ServiceConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::Internal(format!("migration failed: {e}")))?;
    Ok(pool)
}
