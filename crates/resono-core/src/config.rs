//! Service configuration, loaded from the environment.

use std::env;

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_HLS_SEGMENT_SECONDS: u32 = 10;
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Which object storage backend to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackendKind {
    S3,
    Local,
}

/// Configuration for the music service: database, object storage buckets,
/// scratch area and external tooling (feature extractor, segmenter).
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub db_max_connections: u32,

    pub storage_backend: StorageBackendKind,
    // S3-compatible endpoint (MinIO etc.); None means AWS default resolution
    pub s3_endpoint: Option<String>,
    pub s3_region: Option<String>,
    pub audio_bucket: String,
    pub track_image_bucket: String,
    pub playlist_image_bucket: String,
    pub local_storage_path: Option<String>,

    /// Scratch directory for in-flight uploads. Files inside are named by
    /// track id, so concurrent ingestions never collide.
    pub scratch_dir: String,

    pub extractor_command: String,
    pub extractor_script: String,
    pub ffmpeg_path: String,
    pub hls_segment_seconds: u32,
    /// Upper bound on a single extractor/segmenter invocation.
    pub command_timeout_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let storage_backend = match env_or("STORAGE_BACKEND", "s3").to_lowercase().as_str() {
            "local" => StorageBackendKind::Local,
            _ => StorageBackendKind::S3,
        };

        Ok(Self {
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            storage_backend,
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_region: env::var("S3_REGION").ok(),
            audio_bucket: env_or("AUDIO_BUCKET", "tracks"),
            track_image_bucket: env_or("TRACK_IMAGE_BUCKET", "track-covers"),
            playlist_image_bucket: env_or("PLAYLIST_IMAGE_BUCKET", "playlist-covers"),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            scratch_dir: env_or("SCRATCH_DIR", "/tmp/resono"),
            extractor_command: env_or("EXTRACTOR_COMMAND", "python3"),
            extractor_script: env_or("EXTRACTOR_SCRIPT", "scripts/analyze_song.py"),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            hls_segment_seconds: env::var("HLS_SEGMENT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HLS_SEGMENT_SECONDS),
            command_timeout_secs: env::var("COMMAND_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS),
        })
    }
}
