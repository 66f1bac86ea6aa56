//! Local filesystem storage backend, mainly for development and tests.

use crate::traits::{
    Bucket, BucketNames, ByteStream, ObjectStorage, StorageError, StorageResult,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::fs;
use tokio_util::io::ReaderStream;

/// Stores objects under `<base>/<bucket>/<key>`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    buckets: BucketNames,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>, buckets: BucketNames) -> StorageResult<Self> {
        let base_path = base_path.into();
        for bucket in Bucket::ALL {
            let dir = base_path.join(buckets.name(bucket));
            fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(LocalStorage { base_path, buckets })
    }

    /// Keys are flat; anything that could escape the bucket directory is
    /// rejected.
    fn object_path(&self, bucket: Bucket, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.contains('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(self.buckets.name(bucket)).join(key))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, bucket: Bucket, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        fs::write(&path, data)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(bucket = ?bucket, key = %key, "local object written");
        Ok(())
    }

    async fn get(&self, bucket: Bucket, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn get_stream(&self, bucket: Bucket, key: &str) -> StorageResult<ByteStream> {
        let path = self.object_path(bucket, key)?;
        let file = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(StorageError::from(e)),
        };
        let stream = ReaderStream::new(file).map(|chunk| chunk.map_err(StorageError::from));
        Ok(Box::pin(stream))
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, bucket: Bucket, key: &str) -> StorageResult<bool> {
        let path = self.object_path(bucket, key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}
