//! Playback telemetry: listen events and their played sub-intervals.

use serde::{Deserialize, Serialize};

/// Identity of the listener behind a playback session. "No authenticated
/// listener" and "anonymous by choice" are the same thing here; the event
/// column is NULL either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListenerId {
    Listener(i64),
    Anonymous,
}

impl ListenerId {
    /// Database representation (NULL for anonymous).
    pub fn as_db(&self) -> Option<i64> {
        match self {
            ListenerId::Listener(id) => Some(*id),
            ListenerId::Anonymous => None,
        }
    }
}

impl From<Option<i64>> for ListenerId {
    fn from(v: Option<i64>) -> Self {
        match v {
            Some(id) => ListenerId::Listener(id),
            None => ListenerId::Anonymous,
        }
    }
}

/// One contiguous played sub-interval, as reported by the player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListenPartInput {
    pub start_time: i32,
    pub end_time: i32,
}

/// A playback session to record. Parts may be empty.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListen {
    pub listener: ListenerId,
    pub track_id: i64,
    pub country: String,
    pub device: String,
    /// Total seconds listened across the session; >= 0.
    pub total_listen_time: i32,
    pub parts: Vec<ListenPartInput>,
}
