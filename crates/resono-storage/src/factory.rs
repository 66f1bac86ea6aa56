//! Backend selection from service configuration.

use std::sync::Arc;

use resono_core::config::{ServiceConfig, StorageBackendKind};

use crate::local::LocalStorage;
use crate::s3::S3Storage;
use crate::traits::{BucketNames, ObjectStorage, StorageError, StorageResult};

fn bucket_names(config: &ServiceConfig) -> BucketNames {
    BucketNames {
        audio: config.audio_bucket.clone(),
        track_images: config.track_image_bucket.clone(),
        playlist_images: config.playlist_image_bucket.clone(),
    }
}

/// Build the configured storage backend.
pub async fn create_storage(config: &ServiceConfig) -> StorageResult<Arc<dyn ObjectStorage>> {
    let buckets = bucket_names(config);
    match config.storage_backend {
        StorageBackendKind::S3 => {
            let storage = S3Storage::new(
                &buckets,
                config.s3_region.clone(),
                config.s3_endpoint.clone(),
            )?;
            tracing::info!(
                endpoint = config.s3_endpoint.as_deref().unwrap_or("aws"),
                "using S3 object storage"
            );
            Ok(Arc::new(storage))
        }
        StorageBackendKind::Local => {
            let base = config.local_storage_path.as_deref().ok_or_else(|| {
                StorageError::ConfigError(
                    "LOCAL_STORAGE_PATH must be set for the local backend".to_string(),
                )
            })?;
            let storage = LocalStorage::new(base, buckets).await?;
            tracing::info!(path = %base, "using local object storage");
            Ok(Arc::new(storage))
        }
    }
}
