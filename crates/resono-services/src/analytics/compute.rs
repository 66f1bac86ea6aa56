//! Pure analytics math over raw telemetry rows.
//!
//! Everything here is deterministic over its inputs; the repositories fetch
//! rows, these functions do the bucketing and percentage work.

use resono_core::models::{
    CountryListeners, DayPeriod, DayPeriodShare, GeographyData, RetentionPoint, SegmentIntensity,
};

/// Retention buckets are 5% wide, 0..=100 inclusive.
pub const RETENTION_POINTS: usize = 21;

const TOP_COUNTRIES: usize = 10;

/// Audience retention curve from each listener's first-listen duration.
///
/// Each listen is normalized to `total / duration * 100`, clamped to
/// [0, 100] and floored to the nearest 5. A bucket's value is the share of
/// listeners whose normalized position reached at least that bucket, so the
/// curve is monotonically non-increasing. No listeners (or a degenerate
/// duration) yields 21 zeros.
pub fn retention_curve(first_listen_times: &[i32], duration: i32) -> Vec<RetentionPoint> {
    let mut curve: Vec<RetentionPoint> = (0..RETENTION_POINTS)
        .map(|i| RetentionPoint {
            time_percent: (i * 5) as u32,
            percent_listeners: 0.0,
        })
        .collect();
    if first_listen_times.is_empty() || duration <= 0 {
        return curve;
    }

    let total = first_listen_times.len() as f64;
    for &listened in first_listen_times {
        let normalized = (f64::from(listened) / f64::from(duration) * 100.0).clamp(0.0, 100.0);
        let bucket = ((normalized / 5.0).floor() * 5.0) as u32;
        for point in curve.iter_mut() {
            if point.time_percent <= bucket {
                point.percent_listeners += 100.0 / total;
            }
        }
    }
    curve
}

/// Listen-part activity per 10-second segment of the track.
///
/// Segments cover `0..floor(duration / 10)`; a part counts toward the
/// segment its `end_time` falls in. Zero-filled where no parts ended.
pub fn intensity_map(part_end_times: &[i32], duration: i32) -> Vec<SegmentIntensity> {
    let segments = if duration > 0 { duration as u32 / 10 } else { 0 };
    let mut map: Vec<SegmentIntensity> = (0..segments)
        .map(|segment| SegmentIntensity { segment, value: 0 })
        .collect();
    for &end in part_end_times {
        if end < 0 {
            continue;
        }
        let segment = (end / 10) as usize;
        if let Some(point) = map.get_mut(segment) {
            point.value += 1;
        }
    }
    map
}

/// Each day period's share of the given engagement hours, in percent.
/// All four periods are always present; no events means four zeros.
pub fn day_period_shares(hours: &[u32]) -> Vec<DayPeriodShare> {
    let percents = day_period_percents(hours);
    DayPeriod::ALL
        .iter()
        .zip(percents)
        .map(|(&period, percent)| DayPeriodShare { period, percent })
        .collect()
}

/// Percentages in [`DayPeriod::ALL`] order (morning, afternoon, evening,
/// night).
pub fn day_period_percents(hours: &[u32]) -> [f64; 4] {
    let mut counts = [0usize; 4];
    for &hour in hours {
        let index = DayPeriod::ALL
            .iter()
            .position(|&p| p == DayPeriod::from_hour(hour))
            .unwrap_or(3);
        counts[index] += 1;
    }
    let total = hours.len();
    if total == 0 {
        return [0.0; 4];
    }
    counts.map(|c| c as f64 * 100.0 / total as f64)
}

/// Shape per-country distinct-listener counts into map data plus the top 10
/// countries. Input order is preserved for the map; the top list is sorted
/// by listeners descending.
pub fn geography(counts: Vec<CountryListeners>) -> GeographyData {
    let mut top = counts.clone();
    top.sort_by(|a, b| b.listeners.cmp(&a.listeners));
    top.truncate(TOP_COUNTRIES);
    GeographyData {
        top_countries: top,
        map_data: counts,
    }
}

/// `likes * 100 / listens` with integer division; 0 when nothing was
/// listened to.
pub fn engagement_rate(listens: i64, likes: i64) -> i64 {
    if listens <= 0 {
        0
    } else {
        likes * 100 / listens
    }
}
