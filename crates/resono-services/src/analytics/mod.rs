//! Listening analytics: retention, intensity, time-of-day, geography and
//! per-track/global statistics.

pub mod compute;

use std::sync::Arc;

use resono_core::models::{
    DayPeriodShare, GeographyData, GlobalStatistics, RetentionPoint, SegmentIntensity, Track,
    TrackStatistics,
};
use resono_core::validation::validate_stat_days;
use resono_core::{AppError, Period};
use resono_db::{AnalyticsStore, TrackStore};

/// Query-time aggregations over the telemetry tables. All reads are
/// side-effect-free; absent data degrades to empty or zero-filled results
/// rather than an error.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn AnalyticsStore>,
    tracks: Arc<dyn TrackStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn AnalyticsStore>, tracks: Arc<dyn TrackStore>) -> Self {
        Self { store, tracks }
    }

    async fn require_track(&self, track_id: i64) -> Result<Track, AppError> {
        self.tracks
            .get_track(track_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("track {track_id}")))
    }

    /// Audience retention curve over each listener's first listen in the
    /// window. Always 21 points.
    #[tracing::instrument(skip(self))]
    pub async fn retention_curve(
        &self,
        track_id: i64,
        period: Period,
    ) -> Result<Vec<RetentionPoint>, AppError> {
        let track = self.require_track(track_id).await?;
        let times = self
            .store
            .first_listen_times(track_id, period.months())
            .await?;
        Ok(compute::retention_curve(&times, track.duration))
    }

    /// Listen-part activity per 10-second segment.
    #[tracing::instrument(skip(self))]
    pub async fn intensity_map(
        &self,
        track_id: i64,
        period: Period,
    ) -> Result<Vec<SegmentIntensity>, AppError> {
        let track = self.require_track(track_id).await?;
        let ends = self.store.part_end_times(track_id, period.months()).await?;
        Ok(compute::intensity_map(&ends, track.duration))
    }

    /// Share of engagement events per part of the day.
    #[tracing::instrument(skip(self))]
    pub async fn time_of_day(
        &self,
        track_id: i64,
        period: Period,
    ) -> Result<Vec<DayPeriodShare>, AppError> {
        let hours = self
            .store
            .engagement_hours(track_id, period.months())
            .await?;
        Ok(compute::day_period_shares(&hours))
    }

    /// Per-country distinct listeners plus the top 10 countries.
    #[tracing::instrument(skip(self))]
    pub async fn geography(
        &self,
        track_id: i64,
        period: Period,
    ) -> Result<GeographyData, AppError> {
        let counts = self
            .store
            .country_listener_counts(track_id, period.months())
            .await?;
        Ok(compute::geography(counts))
    }

    /// All-time statistics for one track.
    #[tracing::instrument(skip(self))]
    pub async fn track_statistics(&self, track_id: i64) -> Result<TrackStatistics, AppError> {
        let rows = self.store.track_stats_rows(track_id).await?;
        let [morning, afternoon, evening, night] =
            compute::day_period_percents(&rows.listen_hours);
        Ok(TrackStatistics {
            total_listens: rows.listen_hours.len() as i64,
            morning_percent: morning,
            afternoon_percent: afternoon,
            evening_percent: evening,
            night_percent: night,
            total_likes: rows.total_likes,
            total_reposts: rows.total_reposts,
            top_countries: rows.top_countries,
        })
    }

    /// Platform-wide listens/likes/listeners over the last `days` days.
    /// Only 1, 2 or 3 days are accepted.
    #[tracing::instrument(skip(self))]
    pub async fn global_statistics(&self, days: i64) -> Result<GlobalStatistics, AppError> {
        let days = validate_stat_days(days)?;
        let (listens, likes, listeners) = self.store.global_counts(days).await?;
        Ok(GlobalStatistics {
            listens,
            likes,
            listeners,
            engagement: compute::engagement_rate(listens, likes),
        })
    }
}
