//! Content similarity, listening-history and wave recommendations.

pub mod scoring;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use resono_core::models::{ListenerId, ScoredTrack, Track, WaveRequest};
use resono_core::AppError;
use resono_db::{ListenStore, TrackStore};

use scoring::{qualify_window, rank_similar, REFERENCE_SCORE, TOP_LISTENED_WINDOWS};

const RECENT_TRACKS_LIMIT: i64 = 10;

/// Selects track ids for a personalized wave. The policy is external; only
/// the contract lives here. Implementations must honor the request's
/// exclusion set.
#[async_trait]
pub trait WaveCurator: Send + Sync {
    async fn curate(&self, request: &WaveRequest) -> Result<Vec<i64>, AppError>;
}

/// Recommendation reads over the track and telemetry stores.
#[derive(Clone)]
pub struct RecommendationService {
    tracks: Arc<dyn TrackStore>,
    listens: Arc<dyn ListenStore>,
    curator: Arc<dyn WaveCurator>,
}

impl RecommendationService {
    pub fn new(
        tracks: Arc<dyn TrackStore>,
        listens: Arc<dyn ListenStore>,
        curator: Arc<dyn WaveCurator>,
    ) -> Self {
        Self {
            tracks,
            listens,
            curator,
        }
    }

    /// Feature-nearest tracks to the reference. The reference comes first
    /// with the sentinel score, followed by up to 10 candidates ascending
    /// by score; a reference without features yields the reference alone.
    #[tracing::instrument(skip(self))]
    pub async fn similar_tracks(&self, track_id: i64) -> Result<Vec<ScoredTrack>, AppError> {
        let reference = self
            .tracks
            .get_track(track_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("track {track_id}")))?;

        let Some(features) = reference.features else {
            return Ok(vec![ScoredTrack {
                track: reference,
                score: REFERENCE_SCORE,
            }]);
        };

        let candidates = self.tracks.feature_vectors().await?;
        let ranked = rank_similar(track_id, &features, &candidates);

        let ids: Vec<i64> = ranked.iter().map(|(id, _)| *id).collect();
        let scores: HashMap<i64, f64> = ranked.into_iter().collect();

        let mut result = Vec::with_capacity(ids.len() + 1);
        result.push(ScoredTrack {
            track: reference,
            score: REFERENCE_SCORE,
        });
        for track in self.tracks.tracks_by_ids(&ids).await? {
            if let Some(&score) = scores.get(&track.id) {
                result.push(ScoredTrack { track, score });
            }
        }
        Ok(result)
    }

    /// The listener's most-listened tracks over widening windows of 7, 30
    /// and 90 days. The first window producing five tracks with more than
    /// ten listens wins; anonymous listeners have no history.
    #[tracing::instrument(skip(self))]
    pub async fn top_listened_tracks(&self, listener: ListenerId) -> Result<Vec<Track>, AppError> {
        let Some(listener_id) = listener.as_db() else {
            return Ok(Vec::new());
        };

        for window_days in TOP_LISTENED_WINDOWS {
            let counts = self
                .listens
                .listener_track_counts(listener_id, window_days)
                .await?;
            if let Some(top) = qualify_window(&counts) {
                tracing::debug!(listener_id, window_days, "top listened window qualified");
                let ids: Vec<i64> = top.into_iter().map(|(id, _)| id).collect();
                return self.tracks.tracks_by_ids(&ids).await;
            }
        }
        Ok(Vec::new())
    }

    /// The listener's 10 most recently played tracks, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn recent_tracks(&self, listener: ListenerId) -> Result<Vec<Track>, AppError> {
        let Some(listener_id) = listener.as_db() else {
            return Ok(Vec::new());
        };
        let ids = self
            .listens
            .recent_track_ids(listener_id, RECENT_TRACKS_LIMIT)
            .await?;
        self.tracks.tracks_by_ids(&ids).await
    }

    /// Hydrate a personalized wave: the curator picks ids, we return full
    /// track records in the curator's order. An empty curation is an empty
    /// wave, never an error.
    #[tracing::instrument(skip(self, request), fields(listener = ?request.listener))]
    pub async fn personalized_wave(&self, request: &WaveRequest) -> Result<Vec<Track>, AppError> {
        let ids = self.curator.curate(request).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.tracks.tracks_by_ids(&ids).await
    }
}
