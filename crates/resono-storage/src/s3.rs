//! S3-compatible storage backend (AWS S3, MinIO, DigitalOcean Spaces, ...).

use crate::traits::{
    Bucket, BucketNames, ByteStream, ObjectStorage, StorageError, StorageResult,
};
use async_trait::async_trait;
use futures::StreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{Error as ObjectStoreError, ObjectStore, PutPayload};

/// One `AmazonS3` store per logical bucket. Credentials come from the
/// environment (`AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`).
pub struct S3Storage {
    audio: AmazonS3,
    track_images: AmazonS3,
    playlist_images: AmazonS3,
}

impl S3Storage {
    /// `endpoint_url` selects an S3-compatible provider (e.g.
    /// `http://localhost:9000` for MinIO); `None` means plain AWS.
    pub fn new(
        buckets: &BucketNames,
        region: Option<String>,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let build = |bucket: &str| -> StorageResult<AmazonS3> {
            let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket.to_string());
            if let Some(ref region) = region {
                builder = builder.with_region(region.clone());
            }
            if let Some(ref endpoint) = endpoint_url {
                let allow_http = endpoint.starts_with("http://");
                builder = builder
                    .with_endpoint(endpoint.clone())
                    .with_allow_http(allow_http);
            }
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))
        };

        Ok(S3Storage {
            audio: build(&buckets.audio)?,
            track_images: build(&buckets.track_images)?,
            playlist_images: build(&buckets.playlist_images)?,
        })
    }

    fn store(&self, bucket: Bucket) -> &AmazonS3 {
        match bucket {
            Bucket::TrackAudio => &self.audio,
            Bucket::TrackImages => &self.track_images,
            Bucket::PlaylistImages => &self.playlist_images,
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(&self, bucket: Bucket, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let location = Path::from(key);
        let size = data.len();
        let start = std::time::Instant::now();

        self.store(bucket)
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = ?bucket,
                    key = %key,
                    size_bytes = size,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::debug!(
            bucket = ?bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );
        Ok(())
    }

    async fn get(&self, bucket: Bucket, key: &str) -> StorageResult<Vec<u8>> {
        let location = Path::from(key);
        let result = self.store(bucket).get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;
        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn get_stream(&self, bucket: Bucket, key: &str) -> StorageResult<ByteStream> {
        let location = Path::from(key);
        let result = self.store(bucket).get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;
        let stream = result
            .into_stream()
            .map(|chunk| chunk.map_err(|e| StorageError::DownloadFailed(e.to_string())));
        Ok(Box::pin(stream))
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> StorageResult<()> {
        let location = Path::from(key);
        match self.store(bucket).delete(&location).await {
            Ok(()) => Ok(()),
            Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn exists(&self, bucket: Bucket, key: &str) -> StorageResult<bool> {
        let location = Path::from(key);
        match self.store(bucket).head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }
}
