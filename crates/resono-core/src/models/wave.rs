//! Personalized wave request passed to the external curator.

use serde::{Deserialize, Serialize};

use super::listen::ListenerId;

/// Mood/activity/character signals plus the tracks the client has already
/// seen. Curation policy is external; this is only the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveRequest {
    pub activity: String,
    pub character: String,
    pub mood: String,
    pub listener: ListenerId,
    #[serde(default)]
    pub exclude_track_ids: Vec<i64>,
}
