use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::AudioFeatures;

/// Author summary joined onto a track (full user records live in the
/// out-of-scope user service).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackAuthor {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub genre: String,
    /// Track length in whole seconds.
    pub duration: i32,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// All-null until ingestion succeeds; tracks without features are
    /// excluded from similarity scoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<AudioFeatures>,
    pub author: TrackAuthor,
}

/// A track together with its similarity score. The reference track carries
/// the sentinel score `-1.0`, below every computed score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredTrack {
    #[serde(flatten)]
    pub track: Track,
    pub score: f64,
}
