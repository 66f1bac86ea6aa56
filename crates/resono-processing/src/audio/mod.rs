//! The audio tooling capability: feature extraction and HLS segmentation.
//!
//! Pipeline logic talks to this trait, never to subprocesses directly, so
//! ingestion behavior is testable against a fake.

pub mod process;

use async_trait::async_trait;
use std::path::Path;

use resono_core::models::AudioFeatures;

pub use process::ProcessAudioProcessor;

#[async_trait]
pub trait AudioProcessor: Send + Sync {
    /// Analyze a local audio file into the fixed 8-field feature vector.
    async fn extract_features(&self, input: &Path) -> anyhow::Result<AudioFeatures>;

    /// Transcode a local audio file into an HLS manifest at `manifest` and
    /// fixed-duration segment files following `segment_pattern`
    /// (`<track_id>_%d.ts` in the same directory).
    async fn segment(
        &self,
        input: &Path,
        manifest: &Path,
        segment_pattern: &Path,
    ) -> anyhow::Result<()>;
}
