//! Feature-distance scoring and listening-history selection.

use resono_core::models::AudioFeatures;

/// Per-feature weights in [`AudioFeatures::scalars`] order: tempo, chroma,
/// rmse, spectral centroid, spectral bandwidth, rolloff, zero crossing rate.
pub const FEATURE_WEIGHTS: [f64; 7] = [0.5, 1.0, 0.8, 1.2, 1.0, 1.0, 0.7];

/// Sentinel placed on the reference track so it sorts before every computed
/// score.
pub const REFERENCE_SCORE: f64 = -1.0;

/// Similar-tracks responses carry at most this many candidates after the
/// reference.
pub const SIMILAR_LIMIT: usize = 10;

/// Listening windows evaluated for top-listened tracks, narrowest first.
pub const TOP_LISTENED_WINDOWS: [i64; 3] = [7, 30, 90];

/// A track only qualifies as "top listened" above this listen count.
pub const TOP_LISTENED_MIN_COUNT: i64 = 10;

/// A window only qualifies once it yields this many tracks.
pub const TOP_LISTENED_MIN_TRACKS: usize = 5;

/// Weighted relative distance between two feature vectors; lower is more
/// similar. A term is skipped when the reference feature is zero, so a
/// degenerate reference never divides by zero.
pub fn similarity_score(reference: &AudioFeatures, other: &AudioFeatures) -> f64 {
    let reference = reference.scalars();
    let other = other.scalars();
    let mut score = 0.0;
    for i in 0..reference.len() {
        if reference[i] == 0.0 {
            continue;
        }
        score += FEATURE_WEIGHTS[i] * (other[i] - reference[i]).abs() / reference[i];
    }
    score
}

/// Score every candidate against the reference and keep the
/// [`SIMILAR_LIMIT`] lowest, ascending. The reference itself is excluded.
pub fn rank_similar(
    reference_id: i64,
    reference: &AudioFeatures,
    candidates: &[(i64, AudioFeatures)],
) -> Vec<(i64, f64)> {
    let mut scored: Vec<(i64, f64)> = candidates
        .iter()
        .filter(|(id, _)| *id != reference_id)
        .map(|(id, features)| (*id, similarity_score(reference, features)))
        .collect();
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.truncate(SIMILAR_LIMIT);
    scored
}

/// Apply the qualification rules to one window's per-track listen counts
/// (already ordered by count descending): keep counts above
/// [`TOP_LISTENED_MIN_COUNT`]; the window qualifies only with at least
/// [`TOP_LISTENED_MIN_TRACKS`] of them, and then contributes its top 5.
pub fn qualify_window(counts: &[(i64, i64)]) -> Option<Vec<(i64, i64)>> {
    let mut qualifying: Vec<(i64, i64)> = counts
        .iter()
        .filter(|(_, count)| *count > TOP_LISTENED_MIN_COUNT)
        .copied()
        .collect();
    if qualifying.len() < TOP_LISTENED_MIN_TRACKS {
        return None;
    }
    qualifying.truncate(TOP_LISTENED_MIN_TRACKS);
    Some(qualifying)
}
