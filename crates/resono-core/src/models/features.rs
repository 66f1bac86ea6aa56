//! Audio feature vector extracted at ingestion time.

use serde::{Deserialize, Serialize};

/// Round to 5 decimal places, the precision features are persisted at.
fn round5(v: f64) -> f64 {
    (v * 1e5).round() / 1e5
}

/// The fixed 8-field output of the feature extractor: duration plus 7 scalar
/// descriptors used for content similarity. Field names match the
/// extractor's JSON output exactly; unknown or missing fields are a parse
/// error at the ingestion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioFeatures {
    pub duration_sec: f64,
    pub tempo_bpm: f64,
    pub chroma_mean: f64,
    pub rmse_mean: f64,
    pub spectral_centroid: f64,
    pub spectral_bandwidth: f64,
    pub rolloff: f64,
    pub zero_crossing_rate: f64,
}

impl AudioFeatures {
    /// Copy with every field rounded to 5 decimal places.
    pub fn rounded(&self) -> Self {
        Self {
            duration_sec: round5(self.duration_sec),
            tempo_bpm: round5(self.tempo_bpm),
            chroma_mean: round5(self.chroma_mean),
            rmse_mean: round5(self.rmse_mean),
            spectral_centroid: round5(self.spectral_centroid),
            spectral_bandwidth: round5(self.spectral_bandwidth),
            rolloff: round5(self.rolloff),
            zero_crossing_rate: round5(self.zero_crossing_rate),
        }
    }

    /// The 7 similarity scalars, in scoring order (duration is excluded).
    pub fn scalars(&self) -> [f64; 7] {
        [
            self.tempo_bpm,
            self.chroma_mean,
            self.rmse_mean,
            self.spectral_centroid,
            self.spectral_bandwidth,
            self.rolloff,
            self.zero_crossing_rate,
        ]
    }
}
