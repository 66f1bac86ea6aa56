//! Business service layer over the repositories.
//!
//! Hosts the telemetry, analytics and recommendation services consumed by
//! the HTTP surface. Numeric work (retention bucketing, intensity maps,
//! time-of-day shares, similarity scoring, widening-window top tracks)
//! lives in pure modules so it is unit-testable without a database; the
//! services themselves only fetch raw rows and shape responses.

pub mod analytics;
pub mod recommendation;
pub mod telemetry;

pub use analytics::AnalyticsService;
pub use recommendation::{RecommendationService, WaveCurator};
pub use telemetry::TelemetryService;
