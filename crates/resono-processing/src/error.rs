//! Ingestion pipeline stages and typed failures.

use resono_core::AppError;
use resono_storage::StorageError;

/// Where an ingestion currently stands. Each stage gates the next; there is
/// no resumption, only cleanup, for a pipeline that fails mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Pending,
    MetadataPersisted,
    Extracted,
    Transcoded,
    Uploaded,
    Done,
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IngestStage::Pending => "pending",
            IngestStage::MetadataPersisted => "metadata_persisted",
            IngestStage::Extracted => "extracted",
            IngestStage::Transcoded => "transcoded",
            IngestStage::Uploaded => "uploaded",
            IngestStage::Done => "done",
        };
        f.write_str(s)
    }
}

/// One variant per pipeline stage that can fail. Terminal for the request;
/// there are no automatic retries.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("metadata write failed: {0}")]
    MetadataWriteFailed(#[source] AppError),

    #[error("scratch write failed: {0}")]
    ScratchWriteFailed(#[source] std::io::Error),

    #[error("feature extraction failed: {0}")]
    ExtractionFailed(#[source] anyhow::Error),

    #[error("transcode failed: {0}")]
    TranscodeFailed(#[source] anyhow::Error),

    #[error("artifact upload failed: {0}")]
    UploadFailed(#[source] StorageError),
}

impl IngestError {
    /// The last stage that completed before this failure.
    pub fn stage_reached(&self) -> IngestStage {
        match self {
            IngestError::MetadataWriteFailed(_) => IngestStage::Pending,
            IngestError::ScratchWriteFailed(_) => IngestStage::MetadataPersisted,
            IngestError::ExtractionFailed(_) => IngestStage::MetadataPersisted,
            IngestError::TranscodeFailed(_) => IngestStage::Extracted,
            IngestError::UploadFailed(_) => IngestStage::Transcoded,
        }
    }

    /// Stable machine-readable code for the read surface.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::MetadataWriteFailed(_) => "MetadataWriteFailed",
            IngestError::ScratchWriteFailed(_) => "ScratchWriteFailed",
            IngestError::ExtractionFailed(_) => "ExtractionFailed",
            IngestError::TranscodeFailed(_) => "TranscodeFailed",
            IngestError::UploadFailed(_) => "UploadFailed",
        }
    }
}
