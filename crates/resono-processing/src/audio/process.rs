//! Subprocess adapter for the feature extractor and the ffmpeg segmenter.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use resono_core::models::AudioFeatures;
use resono_core::ServiceConfig;

use super::AudioProcessor;

/// Invokes the analysis script (`<command> <script> <file>`) and ffmpeg as
/// blocking child processes, each bounded by `timeout`.
pub struct ProcessAudioProcessor {
    extractor_command: String,
    extractor_script: String,
    ffmpeg_path: String,
    segment_seconds: u32,
    timeout: Duration,
}

impl ProcessAudioProcessor {
    pub fn new(
        extractor_command: String,
        extractor_script: String,
        ffmpeg_path: String,
        segment_seconds: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            extractor_command,
            extractor_script,
            ffmpeg_path,
            segment_seconds,
            timeout,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.extractor_command.clone(),
            config.extractor_script.clone(),
            config.ffmpeg_path.clone(),
            config.hls_segment_seconds,
            Duration::from_secs(config.command_timeout_secs),
        )
    }

    async fn run_bounded(&self, mut command: Command, what: &str) -> Result<std::process::Output> {
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| anyhow!("{what} timed out after {:?}", self.timeout))?
            .with_context(|| format!("failed to spawn {what}"))?;
        Ok(output)
    }
}

#[async_trait]
impl AudioProcessor for ProcessAudioProcessor {
    async fn extract_features(&self, input: &Path) -> Result<AudioFeatures> {
        let mut command = Command::new(&self.extractor_command);
        command
            .arg(&self.extractor_script)
            .arg(input)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = self.run_bounded(command, "feature extractor").await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "feature extractor exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let features: AudioFeatures = serde_json::from_slice(&output.stdout)
            .context("feature extractor produced malformed output")?;
        Ok(features)
    }

    #[tracing::instrument(skip(self), fields(input = %input.display()))]
    async fn segment(
        &self,
        input: &Path,
        manifest: &Path,
        segment_pattern: &Path,
    ) -> Result<()> {
        let mut command = Command::new(&self.ffmpeg_path);
        command
            .arg("-i")
            .arg(input)
            .args(["-vn", "-c:a", "aac", "-b:a", "128k", "-f", "hls"])
            .args(["-hls_time", &self.segment_seconds.to_string()])
            .args(["-hls_list_size", "0"])
            .arg("-hls_segment_filename")
            .arg(segment_pattern)
            .arg(manifest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = self.run_bounded(command, "segmenter").await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }
        Ok(())
    }
}
