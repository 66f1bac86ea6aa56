//! Ingestion pipeline behavior against fakes: a canned audio processor, an
//! in-memory object store and an in-memory track store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use resono_core::models::{AudioFeatures, Track};
use resono_core::AppError;
use resono_db::TrackStore;
use resono_processing::{
    AudioProcessor, CoverImage, IngestCoordinator, IngestError, UploadRequest,
};
use resono_storage::{Bucket, ByteStream, ObjectStorage, StorageError, StorageResult};

fn sample_features() -> AudioFeatures {
    AudioFeatures {
        duration_sec: 200.123456,
        tempo_bpm: 128.0,
        chroma_mean: 0.41,
        rmse_mean: 0.12,
        spectral_centroid: 1800.0,
        spectral_bandwidth: 2000.0,
        rolloff: 4100.0,
        zero_crossing_rate: 0.061239,
    }
}

#[derive(Default)]
struct FakeTrackStore {
    next_id: AtomicI64,
    features: Mutex<HashMap<i64, AudioFeatures>>,
    fail_create: bool,
}

#[async_trait]
impl TrackStore for FakeTrackStore {
    async fn create_track(
        &self,
        _author_id: i64,
        _title: &str,
        _description: &str,
        _genre: &str,
    ) -> Result<i64, AppError> {
        if self.fail_create {
            return Err(AppError::Internal("insert refused".into()));
        }
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn get_track(&self, _id: i64) -> Result<Option<Track>, AppError> {
        Ok(None)
    }

    async fn update_features(
        &self,
        track_id: i64,
        features: &AudioFeatures,
    ) -> Result<(), AppError> {
        self.features
            .lock()
            .unwrap()
            .insert(track_id, features.rounded());
        Ok(())
    }

    async fn feature_vectors(&self) -> Result<Vec<(i64, AudioFeatures)>, AppError> {
        Ok(self
            .features
            .lock()
            .unwrap()
            .iter()
            .map(|(id, f)| (*id, *f))
            .collect())
    }

    async fn tracks_by_ids(&self, _ids: &[i64]) -> Result<Vec<Track>, AppError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct MemoryStorage {
    objects: Mutex<HashMap<(Bucket, String), Vec<u8>>>,
    fail_puts: bool,
}

impl MemoryStorage {
    fn keys(&self) -> Vec<(Bucket, String)> {
        let mut keys: Vec<_> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort_by(|a, b| a.1.cmp(&b.1));
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, bucket: Bucket, key: &str, data: Vec<u8>) -> StorageResult<()> {
        if self.fail_puts {
            return Err(StorageError::UploadFailed("bucket unavailable".into()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert((bucket, key.to_string()), data);
        Ok(())
    }

    async fn get(&self, bucket: Bucket, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket, key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn get_stream(&self, bucket: Bucket, key: &str) -> StorageResult<ByteStream> {
        let data = self.get(bucket, key).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok(bytes::Bytes::from(data))
        })))
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(&(bucket, key.to_string()));
        Ok(())
    }

    async fn exists(&self, bucket: Bucket, key: &str) -> StorageResult<bool> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .contains_key(&(bucket, key.to_string())))
    }
}

/// Writes a manifest and `segments` segment files, like ffmpeg would.
struct FakeProcessor {
    segments: u32,
    fail_extract: bool,
    fail_segment: bool,
    /// Segment files written even when the transcode then "fails".
    partial_segments_on_failure: u32,
    /// Exit cleanly without producing a manifest.
    skip_manifest: bool,
}

impl FakeProcessor {
    fn ok(segments: u32) -> Self {
        Self {
            segments,
            fail_extract: false,
            fail_segment: false,
            partial_segments_on_failure: 0,
            skip_manifest: false,
        }
    }
}

fn write_segments(pattern: &Path, count: u32) {
    let pattern = pattern.to_string_lossy();
    for index in 0..count {
        let path = pattern.replace("%d", &index.to_string());
        std::fs::write(path, format!("segment-{index}")).unwrap();
    }
}

#[async_trait]
impl AudioProcessor for FakeProcessor {
    async fn extract_features(&self, input: &Path) -> anyhow::Result<AudioFeatures> {
        assert!(input.exists(), "extractor must see the scratch file");
        if self.fail_extract {
            anyhow::bail!("analysis script exited with status 1");
        }
        Ok(sample_features())
    }

    async fn segment(
        &self,
        _input: &Path,
        manifest: &Path,
        segment_pattern: &Path,
    ) -> anyhow::Result<()> {
        if self.fail_segment {
            write_segments(segment_pattern, self.partial_segments_on_failure);
            anyhow::bail!("ffmpeg exited with status 1");
        }
        if !self.skip_manifest {
            std::fs::write(manifest, "#EXTM3U\n").unwrap();
        }
        write_segments(segment_pattern, self.segments);
        Ok(())
    }
}

struct Harness {
    tracks: Arc<FakeTrackStore>,
    storage: Arc<MemoryStorage>,
    scratch: tempfile::TempDir,
}

impl Harness {
    fn coordinator(&self, processor: FakeProcessor) -> IngestCoordinator {
        IngestCoordinator::new(
            self.tracks.clone(),
            self.storage.clone(),
            Arc::new(processor),
            self.scratch.path(),
        )
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path())
            .map(|entries| entries.count() == 0)
            .unwrap_or(true)
    }
}

fn harness() -> Harness {
    resono_core::telemetry::init_tracing();
    Harness {
        tracks: Arc::new(FakeTrackStore::default()),
        storage: Arc::new(MemoryStorage::default()),
        scratch: tempfile::tempdir().unwrap(),
    }
}

fn request_with_cover() -> UploadRequest {
    UploadRequest {
        author_id: 11,
        title: "First Light".into(),
        description: "demo".into(),
        genre: "ambient".into(),
        audio: vec![0u8; 1024],
        cover: Some(CoverImage {
            data: vec![9, 9, 9],
            extension: "png".into(),
        }),
    }
}

#[tokio::test]
async fn successful_ingest_uploads_all_artifacts() {
    let h = harness();
    let coordinator = h.coordinator(FakeProcessor::ok(3));

    let track_id = coordinator.ingest(request_with_cover()).await.unwrap();
    assert_eq!(track_id, 1);

    let keys = h.storage.keys();
    assert_eq!(
        keys,
        vec![
            (Bucket::TrackAudio, "1.m3u8".to_string()),
            (Bucket::TrackAudio, "1.mp3".to_string()),
            (Bucket::TrackImages, "1.png".to_string()),
            (Bucket::TrackAudio, "1_0.ts".to_string()),
            (Bucket::TrackAudio, "1_1.ts".to_string()),
            (Bucket::TrackAudio, "1_2.ts".to_string()),
        ]
    );

    // features persisted, rounded to 5 decimals
    let stored = h.tracks.features.lock().unwrap()[&1];
    assert_eq!(stored.duration_sec, 200.12346);
    assert_eq!(stored.zero_crossing_rate, 0.06124);

    assert!(h.scratch_is_empty(), "scratch must be cleaned on success");
}

#[tokio::test]
async fn ingest_without_cover_skips_image_bucket() {
    let h = harness();
    let coordinator = h.coordinator(FakeProcessor::ok(1));

    let mut request = request_with_cover();
    request.cover = None;
    coordinator.ingest(request).await.unwrap();

    assert!(h
        .storage
        .keys()
        .iter()
        .all(|(bucket, _)| *bucket == Bucket::TrackAudio));
}

#[tokio::test]
async fn extraction_failure_leaves_no_features_and_no_uploads() {
    let h = harness();
    let coordinator = h.coordinator(FakeProcessor {
        fail_extract: true,
        ..FakeProcessor::ok(3)
    });

    let err = coordinator.ingest(request_with_cover()).await.unwrap_err();
    assert!(matches!(err, IngestError::ExtractionFailed(_)));
    assert_eq!(err.code(), "ExtractionFailed");

    assert!(h.tracks.features.lock().unwrap().is_empty());
    assert!(h.storage.keys().is_empty());
    assert!(h.scratch_is_empty(), "scratch must be cleaned on failure");
}

#[tokio::test]
async fn transcode_failure_cleans_partial_segments() {
    let h = harness();
    let coordinator = h.coordinator(FakeProcessor {
        fail_segment: true,
        partial_segments_on_failure: 2,
        ..FakeProcessor::ok(5)
    });

    let err = coordinator.ingest(request_with_cover()).await.unwrap_err();
    assert!(matches!(err, IngestError::TranscodeFailed(_)));

    // features were persisted before the transcode stage, but nothing hit
    // the object store
    assert!(h.tracks.features.lock().unwrap().contains_key(&1));
    assert!(h.storage.keys().is_empty());
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn metadata_failure_aborts_before_any_file_io() {
    let h = harness();
    let tracks = Arc::new(FakeTrackStore {
        fail_create: true,
        ..FakeTrackStore::default()
    });
    let coordinator = IngestCoordinator::new(
        tracks,
        h.storage.clone(),
        Arc::new(FakeProcessor::ok(1)),
        h.scratch.path(),
    );

    let err = coordinator.ingest(request_with_cover()).await.unwrap_err();
    assert!(matches!(err, IngestError::MetadataWriteFailed(_)));
    assert!(h.storage.keys().is_empty());
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn missing_artifact_at_upload_time_is_an_upload_failure() {
    let h = harness();
    let coordinator = h.coordinator(FakeProcessor {
        skip_manifest: true,
        ..FakeProcessor::ok(2)
    });

    let err = coordinator.ingest(request_with_cover()).await.unwrap_err();
    assert!(matches!(err, IngestError::UploadFailed(_)));
    assert_eq!(err.code(), "UploadFailed");
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn upload_failure_is_typed_and_scratch_cleaned() {
    let h = harness();
    let storage = Arc::new(MemoryStorage {
        fail_puts: true,
        ..MemoryStorage::default()
    });
    let coordinator = IngestCoordinator::new(
        h.tracks.clone(),
        storage,
        Arc::new(FakeProcessor::ok(2)),
        h.scratch.path(),
    );

    let err = coordinator.ingest(request_with_cover()).await.unwrap_err();
    assert!(matches!(err, IngestError::UploadFailed(_)));
    assert_eq!(err.code(), "UploadFailed");
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn concurrent_ingests_do_not_collide() {
    let h = harness();
    let coordinator = Arc::new(h.coordinator(FakeProcessor::ok(2)));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let coordinator = coordinator.clone();
        let mut request = request_with_cover();
        request.cover = None;
        handles.push(tokio::spawn(
            async move { coordinator.ingest(request).await },
        ));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    // every track got its own manifest and segments
    for id in ids {
        assert!(h
            .storage
            .keys()
            .contains(&(Bucket::TrackAudio, format!("{id}.m3u8"))));
    }
    assert!(h.scratch_is_empty());
}
