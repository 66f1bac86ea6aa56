//! Audio ingestion: feature extraction, HLS transcode, artifact upload.
//!
//! The [`IngestCoordinator`] runs the five-stage upload pipeline
//! (metadata → scratch → extract → transcode → upload) with typed per-stage
//! failures and best-effort scratch cleanup on every exit path. External
//! tooling sits behind the [`AudioProcessor`] capability trait; the
//! [`ProcessAudioProcessor`] adapter shells out to the feature-extractor
//! script and ffmpeg with a bounded timeout.

pub mod audio;
pub mod error;
pub mod ingest;

pub use audio::{AudioProcessor, ProcessAudioProcessor};
pub use error::{IngestError, IngestStage};
pub use ingest::{CoverImage, IngestCoordinator, UploadRequest};
