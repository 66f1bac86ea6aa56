//! Storage abstraction trait and error type.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Streaming download body.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Logical bucket an object lives in. Physical bucket names (or local
/// subdirectories) come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// HLS manifests, segments and source audio files.
    TrackAudio,
    /// Track cover images.
    TrackImages,
    /// Playlist cover images.
    PlaylistImages,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::TrackAudio, Bucket::TrackImages, Bucket::PlaylistImages];
}

/// Physical bucket names (or local subdirectories) for the logical buckets.
#[derive(Debug, Clone)]
pub struct BucketNames {
    pub audio: String,
    pub track_images: String,
    pub playlist_images: String,
}

impl BucketNames {
    pub fn name(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::TrackAudio => &self.audio,
            Bucket::TrackImages => &self.track_images,
            Bucket::PlaylistImages => &self.playlist_images,
        }
    }
}

/// Storage abstraction trait
///
/// All backends (S3-compatible, local filesystem) implement this. Keys are
/// flat; writes are idempotent by key.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload an object, overwriting any previous content under the key.
    async fn put(&self, bucket: Bucket, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Download a whole object.
    async fn get(&self, bucket: Bucket, key: &str) -> StorageResult<Vec<u8>>;

    /// Download an object as a stream of chunks (for serving segments
    /// without buffering them fully).
    async fn get_stream(&self, bucket: Bucket, key: &str) -> StorageResult<ByteStream>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, bucket: Bucket, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, bucket: Bucket, key: &str) -> StorageResult<bool>;
}
