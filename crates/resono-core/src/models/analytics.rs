//! Analytics read-surface payloads.

use serde::Serialize;

/// One point of the audience retention curve: the share of listeners whose
/// normalized first listen reached at least `time_percent` of the track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetentionPoint {
    pub time_percent: u32,
    pub percent_listeners: f64,
}

/// Listen-part activity within one 10-second segment of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentIntensity {
    pub segment: u32,
    pub value: i64,
}

/// Part of the day an engagement event falls into, by local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 4] = [
        DayPeriod::Morning,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
        DayPeriod::Night,
    ];

    /// Classify an hour of day (0..=23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=10 => DayPeriod::Morning,
            11..=17 => DayPeriod::Afternoon,
            18..=23 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }
}

/// A day period's share of the window's engagement events, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayPeriodShare {
    pub period: DayPeriod,
    pub percent: f64,
}

/// Distinct-listener count for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryListeners {
    pub country: String,
    pub listeners: i64,
}

/// Geography of a track's audience: full per-country data for the map plus
/// the top 10 countries by distinct listeners.
#[derive(Debug, Clone, Serialize)]
pub struct GeographyData {
    pub top_countries: Vec<CountryListeners>,
    pub map_data: Vec<CountryListeners>,
}

/// All-time statistics for a single track.
#[derive(Debug, Clone, Serialize)]
pub struct TrackStatistics {
    pub total_listens: i64,
    pub morning_percent: f64,
    pub afternoon_percent: f64,
    pub evening_percent: f64,
    pub night_percent: f64,
    pub total_likes: i64,
    pub total_reposts: i64,
    /// Top 5 countries by raw listen count, descending.
    pub top_countries: Vec<String>,
}

/// Platform-wide statistics over a 1-3 day window.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GlobalStatistics {
    pub listens: i64,
    pub likes: i64,
    pub listeners: i64,
    /// `likes * 100 / listens`, integer division; 0 when there are no listens.
    pub engagement: i64,
}
