//! The five-stage upload pipeline.
//!
//! Stage order matters: the metadata row comes first because its id names
//! every later artifact; features are persisted before any blob upload so a
//! failed transcode leaves the track present-but-unprocessed, never the
//! other way around.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use resono_core::models::AudioFeatures;
use resono_db::TrackStore;
use resono_storage::{keys, Bucket, ObjectStorage, StorageError};

use crate::audio::AudioProcessor;
use crate::error::{IngestError, IngestStage};

/// Cover image supplied alongside an upload.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub data: Vec<u8>,
    /// Original file extension without the dot (`png`, `jpg`, ...).
    pub extension: String,
}

/// One track upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub audio: Vec<u8>,
    pub cover: Option<CoverImage>,
}

/// Orchestrates one upload end to end. Runs synchronously on the calling
/// worker; distinct uploads are independent because every scratch file and
/// object key derives from the track id.
pub struct IngestCoordinator {
    tracks: Arc<dyn TrackStore>,
    storage: Arc<dyn ObjectStorage>,
    processor: Arc<dyn AudioProcessor>,
    scratch_dir: PathBuf,
}

impl IngestCoordinator {
    pub fn new(
        tracks: Arc<dyn TrackStore>,
        storage: Arc<dyn ObjectStorage>,
        processor: Arc<dyn AudioProcessor>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tracks,
            storage,
            processor,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Run the pipeline. On success the returned id references a fully
    /// ingested track; on failure the track row may exist without features
    /// or artifacts, and all scratch files are cleaned up either way.
    pub async fn ingest(&self, request: UploadRequest) -> Result<i64, IngestError> {
        let track_id = self
            .tracks
            .create_track(
                request.author_id,
                &request.title,
                &request.description,
                &request.genre,
            )
            .await
            .map_err(IngestError::MetadataWriteFailed)?;

        tracing::info!(track_id, stage = %IngestStage::MetadataPersisted, "ingestion started");

        let result = self.run_from_scratch(track_id, &request).await;

        // Cleanup runs on every exit path and never overrides the primary
        // outcome; failures here are logged only.
        self.cleanup_scratch(track_id).await;

        match &result {
            Ok(()) => tracing::info!(track_id, stage = %IngestStage::Done, "ingestion complete"),
            Err(e) => tracing::error!(
                track_id,
                stage = %e.stage_reached(),
                code = e.code(),
                error = %e,
                "ingestion failed"
            ),
        }
        result.map(|()| track_id)
    }

    fn audio_path(&self, track_id: i64) -> PathBuf {
        self.scratch_dir.join(format!("{track_id}.mp3"))
    }

    fn manifest_path(&self, track_id: i64) -> PathBuf {
        self.scratch_dir.join(format!("{track_id}.m3u8"))
    }

    async fn run_from_scratch(
        &self,
        track_id: i64,
        request: &UploadRequest,
    ) -> Result<(), IngestError> {
        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(IngestError::ScratchWriteFailed)?;

        let audio_path = self.audio_path(track_id);
        tokio::fs::write(&audio_path, &request.audio)
            .await
            .map_err(IngestError::ScratchWriteFailed)?;

        let features = self
            .processor
            .extract_features(&audio_path)
            .await
            .map_err(IngestError::ExtractionFailed)?;
        self.persist_features(track_id, &features).await?;
        tracing::debug!(track_id, stage = %IngestStage::Extracted, "features persisted");

        let manifest_path = self.manifest_path(track_id);
        let segment_pattern = self.scratch_dir.join(format!("{track_id}_%d.ts"));
        self.processor
            .segment(&audio_path, &manifest_path, &segment_pattern)
            .await
            .map_err(IngestError::TranscodeFailed)?;
        tracing::debug!(track_id, stage = %IngestStage::Transcoded, "transcode finished");

        self.upload_artifacts(track_id, &audio_path, &manifest_path)
            .await?;

        if let Some(cover) = &request.cover {
            self.storage
                .put(
                    Bucket::TrackImages,
                    &keys::cover(track_id, &cover.extension),
                    cover.data.clone(),
                )
                .await
                .map_err(IngestError::UploadFailed)?;
        }
        tracing::debug!(track_id, stage = %IngestStage::Uploaded, "artifacts uploaded");

        Ok(())
    }

    async fn persist_features(
        &self,
        track_id: i64,
        features: &AudioFeatures,
    ) -> Result<(), IngestError> {
        self.tracks
            .update_features(track_id, features)
            .await
            .map_err(IngestError::MetadataWriteFailed)
    }

    async fn put_file(&self, bucket: Bucket, key: &str, path: &Path) -> Result<(), IngestError> {
        // The artifact is gone or unreadable, so the upload stage is the one
        // that failed.
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| IngestError::UploadFailed(StorageError::IoError(e)))?;
        self.storage
            .put(bucket, key, data)
            .await
            .map_err(IngestError::UploadFailed)
    }

    async fn upload_artifacts(
        &self,
        track_id: i64,
        audio_path: &Path,
        manifest_path: &Path,
    ) -> Result<(), IngestError> {
        self.put_file(Bucket::TrackAudio, &keys::source_audio(track_id), audio_path)
            .await?;
        self.put_file(Bucket::TrackAudio, &keys::manifest(track_id), manifest_path)
            .await?;
        for (name, path) in self.segment_files(track_id).await {
            self.put_file(Bucket::TrackAudio, &name, &path).await?;
        }
        Ok(())
    }

    /// Segment files the transcoder produced for this track, ordered by
    /// segment index.
    async fn segment_files(&self, track_id: i64) -> Vec<(String, PathBuf)> {
        let mut segments: Vec<(u32, String, PathBuf)> = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(&self.scratch_dir).await else {
            return Vec::new();
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if keys::is_segment_of(track_id, &name) {
                let index = name
                    .trim_start_matches(&format!("{track_id}_"))
                    .trim_end_matches(".ts")
                    .parse()
                    .unwrap_or(u32::MAX);
                segments.push((index, name, entry.path()));
            }
        }
        segments.sort_by_key(|(index, _, _)| *index);
        segments
            .into_iter()
            .map(|(_, name, path)| (name, path))
            .collect()
    }

    /// Best-effort removal of every scratch file belonging to the track,
    /// including partial transcoder output.
    async fn cleanup_scratch(&self, track_id: i64) {
        let mut targets = vec![self.audio_path(track_id), self.manifest_path(track_id)];
        targets.extend(
            self.segment_files(track_id)
                .await
                .into_iter()
                .map(|(_, path)| path),
        );

        for path in targets {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(track_id, path = %path.display(), error = %e, "scratch cleanup failed");
                }
            }
        }
    }
}
