//! Track repository: metadata rows, feature persistence, hydration.

use async_trait::async_trait;
use resono_core::models::{AudioFeatures, Track, TrackAuthor};
use resono_core::AppError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const TRACK_COLUMNS: &str = r#"
    t.id, t.author_id, t.title, t.description, t.genre, t.duration,
    t.is_blocked, t.created_at, t.updated_at,
    t.duration_sec, t.tempo_bpm, t.chroma_mean, t.rmse_mean,
    t.spectral_centroid, t.spectral_bandwidth, t.rolloff, t.zero_crossing_rate,
    u.id AS author_user_id, u.username AS author_username, u.avatar AS author_avatar
"#;

fn features_from_row(row: &PgRow) -> Result<Option<AudioFeatures>, sqlx::Error> {
    let fields: [Option<f64>; 8] = [
        row.try_get("duration_sec")?,
        row.try_get("tempo_bpm")?,
        row.try_get("chroma_mean")?,
        row.try_get("rmse_mean")?,
        row.try_get("spectral_centroid")?,
        row.try_get("spectral_bandwidth")?,
        row.try_get("rolloff")?,
        row.try_get("zero_crossing_rate")?,
    ];
    // All-or-nothing: features are written in one statement after a
    // successful extraction, so a partially null vector means "absent".
    if fields.iter().any(Option::is_none) {
        return Ok(None);
    }
    Ok(Some(AudioFeatures {
        duration_sec: fields[0].unwrap_or_default(),
        tempo_bpm: fields[1].unwrap_or_default(),
        chroma_mean: fields[2].unwrap_or_default(),
        rmse_mean: fields[3].unwrap_or_default(),
        spectral_centroid: fields[4].unwrap_or_default(),
        spectral_bandwidth: fields[5].unwrap_or_default(),
        rolloff: fields[6].unwrap_or_default(),
        zero_crossing_rate: fields[7].unwrap_or_default(),
    }))
}

fn track_from_row(row: &PgRow) -> Result<Track, sqlx::Error> {
    Ok(Track {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        genre: row.try_get("genre")?,
        duration: row.try_get("duration")?,
        is_blocked: row.try_get("is_blocked")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        features: features_from_row(row)?,
        author: TrackAuthor {
            id: row.try_get("author_user_id")?,
            username: row.try_get("author_username")?,
            avatar: row.try_get("author_avatar")?,
        },
    })
}

/// Track persistence operations used by ingestion and recommendations.
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Insert the metadata row and return the new id. Runs before any file
    /// processing; the id drives deterministic artifact naming.
    async fn create_track(
        &self,
        author_id: i64,
        title: &str,
        description: &str,
        genre: &str,
    ) -> Result<i64, AppError>;

    async fn get_track(&self, id: i64) -> Result<Option<Track>, AppError>;

    /// Persist the feature vector, rounded to 5 decimal places.
    async fn update_features(&self, track_id: i64, features: &AudioFeatures)
        -> Result<(), AppError>;

    /// Feature vectors of every track that has one, including the track ids.
    async fn feature_vectors(&self) -> Result<Vec<(i64, AudioFeatures)>, AppError>;

    /// Hydrate tracks (with authors) for the given ids, preserving the
    /// input order. Unknown ids are skipped.
    async fn tracks_by_ids(&self, ids: &[i64]) -> Result<Vec<Track>, AppError>;
}

#[derive(Clone)]
pub struct TrackRepository {
    pool: PgPool,
}

impl TrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackStore for TrackRepository {
    async fn create_track(
        &self,
        author_id: i64,
        title: &str,
        description: &str,
        genre: &str,
    ) -> Result<i64, AppError> {
        let row = sqlx::query(
            r#"
            INSERT INTO tracks (author_id, title, description, genre)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(title)
        .bind(description)
        .bind(genre)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn get_track(&self, id: i64) -> Result<Option<Track>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {TRACK_COLUMNS}
            FROM tracks t
            JOIN users u ON t.author_id = u.id
            WHERE t.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(track_from_row).transpose().map_err(Into::into)
    }

    #[tracing::instrument(skip(self, features), fields(track_id = %track_id))]
    async fn update_features(
        &self,
        track_id: i64,
        features: &AudioFeatures,
    ) -> Result<(), AppError> {
        let f = features.rounded();
        sqlx::query(
            r#"
            UPDATE tracks SET
                duration_sec = $1, tempo_bpm = $2, chroma_mean = $3, rmse_mean = $4,
                spectral_centroid = $5, spectral_bandwidth = $6, rolloff = $7,
                zero_crossing_rate = $8, updated_at = NOW()
            WHERE id = $9
            "#,
        )
        .bind(f.duration_sec)
        .bind(f.tempo_bpm)
        .bind(f.chroma_mean)
        .bind(f.rmse_mean)
        .bind(f.spectral_centroid)
        .bind(f.spectral_bandwidth)
        .bind(f.rolloff)
        .bind(f.zero_crossing_rate)
        .bind(track_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn feature_vectors(&self) -> Result<Vec<(i64, AudioFeatures)>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, duration_sec, tempo_bpm, chroma_mean, rmse_mean,
                   spectral_centroid, spectral_bandwidth, rolloff, zero_crossing_rate
            FROM tracks
            WHERE tempo_bpm IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(features) = features_from_row(row)? {
                out.push((row.try_get::<i64, _>("id")?, features));
            }
        }
        Ok(out)
    }

    async fn tracks_by_ids(&self, ids: &[i64]) -> Result<Vec<Track>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TRACK_COLUMNS}
            FROM tracks t
            JOIN users u ON t.author_id = u.id
            WHERE t.id = ANY($1)
            "#
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id = std::collections::HashMap::with_capacity(rows.len());
        for row in &rows {
            let track = track_from_row(row)?;
            by_id.insert(track.id, track);
        }
        // caller's order wins (e.g. curator ranking)
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
