use async_trait::async_trait;
use tracing::info;

use crate::config::MediaConfig;
use crate::error::Result;
use super::{MediaCommandBuilder, MuxJob, Transcoder};

/// Concrete transcoder (FFmpeg-based)
pub struct FfmpegTranscoder {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegTranscoder {
    /// Create a new ffmpeg transcoder
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn mux(&self, job: &MuxJob) -> Result<()> {
        info!(
            "Muxing {} (audio: {}) -> {}",
            job.video_url,
            job.audio_url.as_deref().unwrap_or("none"),
            job.output.display()
        );

        let command = self.command_builder.mux(
            &job.video_url,
            job.audio_url.as_deref(),
            &job.output,
            &self.config.input_options,
            &self.config.output_options,
        );

        command.execute().await?;

        info!("Mux completed: {}", job.output.display());
        Ok(())
    }

    async fn check_availability(&self) -> Result<String> {
        let stdout = self.command_builder.version_check().execute().await?;
        // The first line carries the version
        let version = stdout.lines().next().unwrap_or("Unknown version").to_string();
        info!("Media processor is available: {}", version);
        Ok(version)
    }
}
