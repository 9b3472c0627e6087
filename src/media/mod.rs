// Media acquisition
//
// - Acquire: per-kind acquisition with size ceiling and transcode retry
// - Processor: ffmpeg-backed Transcoder
// - Commands: ffmpeg command builders
// - Remote: reqwest-backed size probe and downloader

pub mod acquire;
pub mod commands;
pub mod processor;
pub mod remote;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use acquire::*;
pub use commands::*;
pub use processor::*;
pub use remote::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Name of the audio track reddit serves next to the muted video
pub const AUDIO_SIBLING: &str = "DASH_audio.mp4";

/// One mux run: a muted video stream, an optional separate audio stream
/// and the file to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxJob {
    pub video_url: String,
    pub audio_url: Option<String>,
    pub output: PathBuf,
}

impl MuxJob {
    pub fn new<P: Into<PathBuf>>(video_url: &str, with_audio: bool, output: P) -> Self {
        Self {
            video_url: video_url.to_string(),
            audio_url: with_audio.then(|| sibling_url(video_url, AUDIO_SIBLING)),
            output: output.into(),
        }
    }

    /// Same job with the audio input dropped
    pub fn without_audio(&self) -> Self {
        Self {
            audio_url: None,
            ..self.clone()
        }
    }
}

/// Replace the trailing path segment of a URL
pub fn sibling_url(url: &str, name: &str) -> String {
    match url.rfind('/') {
        Some(index) => format!("{}{}", &url[..=index], name),
        None => name.to_string(),
    }
}

/// Muxing/transcode engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Run one mux job, writing `job.output`
    async fn mux(&self, job: &MuxJob) -> Result<()>;

    /// Check if the engine is available
    async fn check_availability(&self) -> Result<String>;
}

/// Remote payload access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    /// Size of the remote payload in bytes
    async fn size_of(&self, url: &str) -> Result<u64>;

    /// Download the remote payload into `dest`
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Factory for the default media collaborators
pub struct MediaFactory;

impl MediaFactory {
    /// Create the default transcoder implementation (FFmpeg-based)
    pub fn create_transcoder(config: MediaConfig) -> Box<dyn Transcoder> {
        Box::new(processor::FfmpegTranscoder::new(config))
    }
}
