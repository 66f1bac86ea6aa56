//! Playback telemetry recording.

use std::sync::Arc;

use resono_core::models::NewListen;
use resono_core::AppError;
use resono_db::ListenStore;

/// Records playback sessions and answers listen counts. An event and its
/// parts are persisted atomically by the store; this layer only validates
/// the reported intervals.
#[derive(Clone)]
pub struct TelemetryService {
    listens: Arc<dyn ListenStore>,
}

impl TelemetryService {
    pub fn new(listens: Arc<dyn ListenStore>) -> Self {
        Self { listens }
    }

    /// Validate and persist a playback session, returning the new listen id.
    #[tracing::instrument(skip(self, listen), fields(track_id = %listen.track_id))]
    pub async fn add_listen(&self, listen: &NewListen) -> Result<i64, AppError> {
        validate_listen(listen)?;
        let listen_id = self.listens.add_listen(listen).await?;
        tracing::debug!(listen_id, parts = listen.parts.len(), "listen recorded");
        Ok(listen_id)
    }

    pub async fn listen_count(&self, track_id: i64) -> Result<i64, AppError> {
        self.listens.listen_count(track_id).await
    }
}

fn validate_listen(listen: &NewListen) -> Result<(), AppError> {
    if listen.total_listen_time < 0 {
        return Err(AppError::InvalidInput(
            "total_listen_time must be non-negative".into(),
        ));
    }
    for part in &listen.parts {
        if part.start_time < 0 {
            return Err(AppError::InvalidInput(
                "listen part start_time must be non-negative".into(),
            ));
        }
        if part.start_time > part.end_time {
            return Err(AppError::InvalidInput(
                "listen part start_time must not exceed end_time".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resono_core::models::{ListenPartInput, ListenerId};

    fn listen(total: i32, parts: Vec<ListenPartInput>) -> NewListen {
        NewListen {
            listener: ListenerId::Anonymous,
            track_id: 7,
            country: "DE".into(),
            device: "web".into(),
            total_listen_time: total,
            parts,
        }
    }

    #[test]
    fn accepts_empty_parts() {
        assert!(validate_listen(&listen(0, Vec::new())).is_ok());
    }

    #[test]
    fn accepts_zero_length_part() {
        let parts = vec![ListenPartInput {
            start_time: 30,
            end_time: 30,
        }];
        assert!(validate_listen(&listen(30, parts)).is_ok());
    }

    // Parts are not checked against the track length at report time; an
    // end past the duration is stored as reported and falls outside every
    // segment when the intensity map is computed.
    #[test]
    fn accepts_parts_past_the_track_end() {
        let parts = vec![ListenPartInput {
            start_time: 170,
            end_time: 260,
        }];
        assert!(validate_listen(&listen(90, parts)).is_ok());
    }

    #[test]
    fn rejects_negative_total() {
        let err = validate_listen(&listen(-1, Vec::new())).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn rejects_inverted_part() {
        let parts = vec![ListenPartInput {
            start_time: 50,
            end_time: 20,
        }];
        assert!(validate_listen(&listen(60, parts)).unwrap_err().is_client_error());
    }

    #[test]
    fn rejects_negative_part_start() {
        let parts = vec![ListenPartInput {
            start_time: -5,
            end_time: 20,
        }];
        assert!(validate_listen(&listen(60, parts)).is_err());
    }
}
