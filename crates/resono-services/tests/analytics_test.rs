//! Analytics service behavior against fake stores.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use resono_core::models::{AudioFeatures, CountryListeners, Track, TrackAuthor};
use resono_core::{AppError, Period};
use resono_db::{AnalyticsStore, TrackStatsRows, TrackStore};
use resono_services::AnalyticsService;

struct OneTrackStore {
    track: Track,
}

#[async_trait]
impl TrackStore for OneTrackStore {
    async fn create_track(
        &self,
        _author_id: i64,
        _title: &str,
        _description: &str,
        _genre: &str,
    ) -> Result<i64, AppError> {
        unimplemented!("not used by analytics")
    }

    async fn get_track(&self, id: i64) -> Result<Option<Track>, AppError> {
        Ok((id == self.track.id).then(|| self.track.clone()))
    }

    async fn update_features(
        &self,
        _track_id: i64,
        _features: &AudioFeatures,
    ) -> Result<(), AppError> {
        unimplemented!("not used by analytics")
    }

    async fn feature_vectors(&self) -> Result<Vec<(i64, AudioFeatures)>, AppError> {
        Ok(Vec::new())
    }

    async fn tracks_by_ids(&self, _ids: &[i64]) -> Result<Vec<Track>, AppError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct FakeAnalyticsStore {
    first_listens: Vec<i32>,
    part_ends: Vec<i32>,
    engagement_hours: Vec<u32>,
    countries: Vec<CountryListeners>,
    stats: TrackStatsRows,
    global: (i64, i64, i64),
}

#[async_trait]
impl AnalyticsStore for FakeAnalyticsStore {
    async fn first_listen_times(&self, _track_id: i64, _months: u32) -> Result<Vec<i32>, AppError> {
        Ok(self.first_listens.clone())
    }

    async fn part_end_times(&self, _track_id: i64, _months: u32) -> Result<Vec<i32>, AppError> {
        Ok(self.part_ends.clone())
    }

    async fn engagement_hours(&self, _track_id: i64, _months: u32) -> Result<Vec<u32>, AppError> {
        Ok(self.engagement_hours.clone())
    }

    async fn country_listener_counts(
        &self,
        _track_id: i64,
        _months: u32,
    ) -> Result<Vec<CountryListeners>, AppError> {
        Ok(self.countries.clone())
    }

    async fn track_stats_rows(&self, _track_id: i64) -> Result<TrackStatsRows, AppError> {
        Ok(self.stats.clone())
    }

    async fn global_counts(&self, _days: i64) -> Result<(i64, i64, i64), AppError> {
        Ok(self.global)
    }
}

fn track(id: i64, duration: i32) -> Track {
    let now = Utc::now();
    Track {
        id,
        author_id: 1,
        title: "t".into(),
        description: String::new(),
        genre: "ambient".into(),
        duration,
        is_blocked: false,
        created_at: now,
        updated_at: now,
        features: None,
        author: TrackAuthor::default(),
    }
}

fn service(duration: i32, store: FakeAnalyticsStore) -> AnalyticsService {
    AnalyticsService::new(
        Arc::new(store),
        Arc::new(OneTrackStore {
            track: track(1, duration),
        }),
    )
}

#[tokio::test]
async fn retention_uses_track_duration() {
    let store = FakeAnalyticsStore {
        first_listens: vec![100],
        ..Default::default()
    };
    let curve = service(200, store)
        .retention_curve(1, Period::default())
        .await
        .unwrap();

    assert_eq!(curve.len(), 21);
    assert_eq!(curve[10].time_percent, 50);
    assert_eq!(curve[10].percent_listeners, 100.0);
    assert_eq!(curve[11].percent_listeners, 0.0);
}

#[tokio::test]
async fn retention_unknown_track_is_not_found() {
    let err = service(200, FakeAnalyticsStore::default())
        .retention_curve(42, Period::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn intensity_map_is_zero_filled_to_track_length() {
    let store = FakeAnalyticsStore {
        part_ends: vec![5, 15, 15],
        ..Default::default()
    };
    let map = service(95, store)
        .intensity_map(1, Period::default())
        .await
        .unwrap();

    assert_eq!(map.len(), 9);
    assert_eq!(map[0].value, 1);
    assert_eq!(map[1].value, 2);
    assert!(map[2..].iter().all(|p| p.value == 0));
}

#[tokio::test]
async fn track_statistics_counts_and_shares() {
    let store = FakeAnalyticsStore {
        stats: TrackStatsRows {
            listen_hours: vec![7, 8, 14, 1],
            total_likes: 12,
            total_reposts: 3,
            top_countries: vec!["DE".into(), "FR".into()],
        },
        ..Default::default()
    };
    let stats = service(200, store).track_statistics(1).await.unwrap();

    assert_eq!(stats.total_listens, 4);
    assert_eq!(stats.morning_percent, 50.0);
    assert_eq!(stats.afternoon_percent, 25.0);
    assert_eq!(stats.evening_percent, 0.0);
    assert_eq!(stats.night_percent, 25.0);
    assert_eq!(stats.total_likes, 12);
    assert_eq!(stats.total_reposts, 3);
    assert_eq!(stats.top_countries, vec!["DE", "FR"]);
}

#[tokio::test]
async fn global_statistics_validates_day_window() {
    let store = FakeAnalyticsStore {
        global: (200, 50, 120),
        ..Default::default()
    };
    let svc = service(200, store);

    for days in [0, 4, -1, 30] {
        let err = svc.global_statistics(days).await.unwrap_err();
        assert!(err.is_client_error(), "accepted days={days}");
    }

    let stats = svc.global_statistics(2).await.unwrap();
    assert_eq!(stats.listens, 200);
    assert_eq!(stats.likes, 50);
    assert_eq!(stats.listeners, 120);
    assert_eq!(stats.engagement, 25);
}

#[tokio::test]
async fn geography_orders_top_countries() {
    let store = FakeAnalyticsStore {
        countries: vec![
            CountryListeners {
                country: "FR".into(),
                listeners: 2,
            },
            CountryListeners {
                country: "DE".into(),
                listeners: 9,
            },
        ],
        ..Default::default()
    };
    let data = service(200, store).geography(1, Period::default()).await.unwrap();

    assert_eq!(data.top_countries[0].country, "DE");
    assert_eq!(data.map_data.len(), 2);
}
