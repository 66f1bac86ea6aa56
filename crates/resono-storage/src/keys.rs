//! Deterministic, track-id-derived object keys.
//!
//! Every artifact of one track shares the id prefix, so a failed ingestion
//! can be retried end to end and overwrite its own partial uploads.

/// Key of the uploaded source audio file.
pub fn source_audio(track_id: i64) -> String {
    format!("{track_id}.mp3")
}

/// Key of the HLS manifest.
pub fn manifest(track_id: i64) -> String {
    format!("{track_id}.m3u8")
}

/// Key of one fixed-duration HLS segment.
pub fn segment(track_id: i64, index: u32) -> String {
    format!("{track_id}_{index}.ts")
}

/// Key of a cover image, keeping the original file extension (no dot).
pub fn cover(track_id: i64, extension: &str) -> String {
    format!("{track_id}.{extension}")
}

/// True if `filename` names a segment of the given track (`<id>_<n>.ts`).
pub fn is_segment_of(track_id: i64, filename: &str) -> bool {
    let Some(rest) = filename.strip_prefix(&format!("{track_id}_")) else {
        return false;
    };
    let Some(index) = rest.strip_suffix(".ts") else {
        return false;
    };
    index.chars().all(|c| c.is_ascii_digit()) && !index.is_empty()
}
