use std::sync::Arc;
use tracing::{info, warn};

use crate::classify::{Classified, ClassifiedSubmission};
use crate::config::{ImageMode, MediaConfig};
use crate::error::{Result, SubfetchError};
use crate::post::{MediaKind, PostResult};
use crate::reddit::Submission;
use crate::scratch::{remove_quietly, ScratchDir};
use super::{MuxJob, RemoteFetch, Transcoder};

/// Turns a classified submission into a locally representable result
pub struct MediaAcquirer {
    remote: Arc<dyn RemoteFetch>,
    transcoder: Arc<dyn Transcoder>,
    scratch: ScratchDir,
    upload_limit: u64,
    image_mode: ImageMode,
}

impl MediaAcquirer {
    pub fn new(
        remote: Arc<dyn RemoteFetch>,
        transcoder: Arc<dyn Transcoder>,
        scratch: ScratchDir,
        config: &MediaConfig,
    ) -> Self {
        Self {
            remote,
            transcoder,
            scratch,
            upload_limit: config.upload_limit,
            image_mode: config.image_mode,
        }
    }

    /// Acquire whatever the classification calls for
    pub async fn acquire(&self, item: &ClassifiedSubmission) -> Result<PostResult> {
        let source_url = Some(item.submission.source_url());

        match &item.classified {
            Classified::Video { fallback_url, is_gif } => {
                self.acquire_video(fallback_url, &item.title, *is_gif, source_url).await
            }
            Classified::Image { url } => self.acquire_image(url, &item.title, source_url).await,
            Classified::Text => Ok(self.acquire_text(&item.submission)),
            Classified::ExternalLink => Ok(self.acquire_external_link(&item.submission)),
        }
    }

    /// Mux reddit's muted video with its audio track into a scratch file.
    ///
    /// A failed transcode is retried exactly once without the audio input,
    /// for sources that have no separate audio track.
    pub async fn acquire_video(
        &self,
        url: &str,
        title: &str,
        is_gif: bool,
        source_url: Option<String>,
    ) -> Result<PostResult> {
        self.check_size(url, "Video").await?;

        let job = MuxJob::new(url, !is_gif, self.scratch.file_path(title, "mp4"));

        if let Err(first) = self.transcoder.mux(&job).await {
            warn!("Transcode of {} failed, retrying without audio: {}", url, first);
            remove_quietly(&job.output).await;

            let retry = job.without_audio();
            if let Err(second) = self.transcoder.mux(&retry).await {
                remove_quietly(&retry.output).await;
                return Err(as_transcode_failure(second));
            }
        }

        info!("Acquired video '{}' at {}", title, job.output.display());
        Ok(PostResult::new(title, job.output.to_string_lossy(), MediaKind::Video, source_url))
    }

    pub async fn acquire_image(
        &self,
        url: &str,
        title: &str,
        source_url: Option<String>,
    ) -> Result<PostResult> {
        match self.image_mode {
            ImageMode::Reference => Ok(PostResult::new(title, url, MediaKind::Image, source_url)),
            ImageMode::Download => self.download_image(url, title, source_url).await,
        }
    }

    /// Legacy image path: fetch the file so it can be relayed
    async fn download_image(
        &self,
        url: &str,
        title: &str,
        source_url: Option<String>,
    ) -> Result<PostResult> {
        self.check_size(url, "Image").await?;

        let extension = if url.contains(".gif") { "gif" } else { "png" };
        let dest = self.scratch.file_path(title, extension);

        if let Err(e) = self.remote.download(url, &dest).await {
            remove_quietly(&dest).await;
            return Err(match e {
                SubfetchError::DownloadFailed(_) => e,
                other => SubfetchError::DownloadFailed(other.to_string()),
            });
        }

        info!("Acquired image '{}' at {}", title, dest.display());
        Ok(PostResult::new(title, dest.to_string_lossy(), MediaKind::Image, source_url))
    }

    pub fn acquire_text(&self, submission: &Submission) -> PostResult {
        PostResult::new(
            &submission.title,
            &submission.selftext,
            MediaKind::Text,
            Some(submission.source_url()),
        )
    }

    pub fn acquire_external_link(&self, submission: &Submission) -> PostResult {
        PostResult::new(
            &submission.title,
            &submission.url,
            MediaKind::ExternalLink,
            Some(submission.source_url()),
        )
    }

    /// Probe the payload size and refuse anything at or over the ceiling
    async fn check_size(&self, url: &str, operation: &str) -> Result<u64> {
        let size = self.remote.size_of(url).await.map_err(|e| {
            let detail = match e {
                SubfetchError::ProbeFailed(detail) => detail,
                other => other.to_string(),
            };
            SubfetchError::ProbeFailed(format!("{} from {}", detail, operation))
        })?;

        if size >= self.upload_limit {
            warn!("{} is {} bytes, over the {} byte limit", url, size, self.upload_limit);
            return Err(SubfetchError::TooLarge {
                size,
                limit: self.upload_limit,
            });
        }

        Ok(size)
    }
}

fn as_transcode_failure(error: SubfetchError) -> SubfetchError {
    match error {
        SubfetchError::TranscodeFailed(_) => error,
        other => SubfetchError::TranscodeFailed(other.to_string()),
    }
}
