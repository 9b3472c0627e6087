use std::sync::Arc;
use tracing::{error, info};

use crate::classify::classify;
use crate::config::{Config, Credentials};
use crate::error::{Result, SubfetchError};
use crate::media::{HttpRemoteFetch, MediaAcquirer, MediaFactory, Transcoder};
use crate::post::{MediaKind, PostResult};
use crate::reddit::{pick_random, PageKind, RedditClient, Submission, SubmissionSource};
use crate::relay::{LitterboxHost, RelayUploader};
use crate::scratch::ScratchDir;

/// Fetch → classify → acquire → assemble, once per request
pub struct PostPipeline {
    source: Arc<dyn SubmissionSource>,
    acquirer: MediaAcquirer,
    relay: RelayUploader,
    scratch: ScratchDir,
    error_markers: Vec<String>,
}

impl PostPipeline {
    pub fn new(
        source: Arc<dyn SubmissionSource>,
        acquirer: MediaAcquirer,
        relay: RelayUploader,
        scratch: ScratchDir,
        error_markers: Vec<String>,
    ) -> Self {
        Self {
            source,
            acquirer,
            relay,
            scratch,
            error_markers,
        }
    }

    /// Wire the default collaborators: reddit, HTTP probe, ffmpeg, litterbox
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self> {
        let scratch = ScratchDir::new(&config.media.scratch_dir);

        let source = RedditClient::new(&config.reddit, credentials.reddit.clone())?;
        let remote = HttpRemoteFetch::new(&config.reddit.user_agent)?;
        let transcoder: Arc<dyn Transcoder> =
            Arc::from(MediaFactory::create_transcoder(config.media.clone()));
        let host = LitterboxHost::new(&config.relay)?;

        let acquirer = MediaAcquirer::new(Arc::new(remote), transcoder, scratch.clone(), &config.media);

        Ok(Self::new(
            Arc::new(source),
            acquirer,
            RelayUploader::new(Arc::new(host)),
            scratch,
            config.relay.error_markers.clone(),
        ))
    }

    /// Fetch one post. Never fails: every error is delivered as an
    /// error-kind result.
    pub async fn get_post_from_subreddit(&self, subreddit: &str, page: Option<PageKind>) -> PostResult {
        let result = match self.fetch_post(subreddit, page).await {
            Ok(result) => result,
            Err(e) => PostResult::from_error(&e),
        };

        if result.is_error() {
            error!("r/{} failed: {}", subreddit, result.content);
        } else {
            info!("r/{} produced a {} post: {}", subreddit, result.kind, result.title);
        }
        result
    }

    async fn fetch_post(&self, subreddit: &str, page: Option<PageKind>) -> Result<PostResult> {
        let submission = self.fetch_submission(subreddit, page).await?;
        let classified = classify(&submission);
        let acquired = self.acquirer.acquire(&classified).await?;
        self.assemble(acquired).await
    }

    async fn fetch_submission(&self, subreddit: &str, page: Option<PageKind>) -> Result<Submission> {
        match page {
            None => self.source.random_submission(subreddit).await,
            Some(page) => {
                let listing = self.source.listing_page(subreddit, page).await?;
                pick_random(listing).ok_or_else(|| {
                    SubfetchError::SourceUnavailable(format!("can't find r/{}", subreddit))
                })
            }
        }
    }

    /// Relay results that still point into the scratch directory; pass
    /// everything else through unchanged
    pub async fn assemble(&self, result: PostResult) -> Result<PostResult> {
        let is_media = matches!(result.kind, MediaKind::Video | MediaKind::Image);
        if !is_media || !self.scratch.contains(&result.content) {
            return Ok(result);
        }

        let relayed = self.relay.relay(&result).await?;
        self.check_relay_response(&relayed.content)?;
        Ok(relayed)
    }

    /// Some hosts answer an outage with an error page and a success status
    fn check_relay_response(&self, content: &str) -> Result<()> {
        let lowered = content.to_lowercase();
        if let Some(marker) = self
            .error_markers
            .iter()
            .find(|marker| lowered.contains(&marker.to_lowercase()))
        {
            return Err(SubfetchError::RelayFailed(format!(
                "host reported '{}': {}",
                marker, content
            )));
        }

        if !content.starts_with("http") {
            return Err(SubfetchError::RelayFailed(format!(
                "host returned no link: {}",
                content
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::media::{MockRemoteFetch, MockTranscoder};
    use crate::reddit::{MockSubmissionSource, RedditVideo, SubmissionMedia};
    use crate::relay::MockRelayHost;
    use std::path::Path;

    struct Mocks {
        source: MockSubmissionSource,
        remote: MockRemoteFetch,
        transcoder: MockTranscoder,
        host: MockRelayHost,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                source: MockSubmissionSource::new(),
                remote: MockRemoteFetch::new(),
                transcoder: MockTranscoder::new(),
                host: MockRelayHost::new(),
            }
        }

        fn into_pipeline(self, dir: &Path) -> PostPipeline {
            let config = Config::default();
            let scratch = ScratchDir::new(dir);
            let acquirer = MediaAcquirer::new(
                Arc::new(self.remote),
                Arc::new(self.transcoder),
                scratch.clone(),
                &config.media,
            );
            PostPipeline::new(
                Arc::new(self.source),
                acquirer,
                RelayUploader::new(Arc::new(self.host)),
                scratch,
                config.relay.error_markers,
            )
        }
    }

    fn video_submission() -> Submission {
        Submission {
            title: "cat".to_string(),
            url: "https://v.redd.it/abc".to_string(),
            permalink: "/r/aww/comments/abc/cat/".to_string(),
            media: Some(SubmissionMedia {
                reddit_video: Some(RedditVideo {
                    fallback_url: "https://v.redd.it/abc/DASH_720.mp4".to_string(),
                    is_gif: false,
                }),
            }),
            ..Default::default()
        }
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_image_reference_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::new();
        mocks.source.expect_random_submission().returning(|_| {
            Ok(Submission {
                title: "cat".to_string(),
                url: "https://x/a.png".to_string(),
                ..Default::default()
            })
        });
        mocks.host.expect_upload().never();

        let result = mocks
            .into_pipeline(dir.path())
            .get_post_from_subreddit("aww", None)
            .await;

        assert_eq!(result.kind, MediaKind::Image);
        assert_eq!(result.title, "cat");
        assert_eq!(result.content, "https://x/a.png");
    }

    #[tokio::test]
    async fn test_video_is_muxed_relayed_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let scratch_root = dir.path().to_path_buf();
        let mut mocks = Mocks::new();
        mocks.source.expect_random_submission().returning(|_| Ok(video_submission()));
        mocks.remote.expect_size_of().returning(|_| Ok(1024));
        mocks.transcoder
            .expect_mux()
            .withf(|job| job.audio_url.as_deref() == Some("https://v.redd.it/abc/DASH_audio.mp4"))
            .times(1)
            .returning(|job| {
                std::fs::write(&job.output, b"mp4")?;
                Ok(())
            });
        mocks.host.expect_upload().times(1).returning(move |path| {
            assert!(path.starts_with(&scratch_root));
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("cat_") && name.ends_with(".mp4"));
            Ok("https://litter.catbox.moe/xyz.mp4".to_string())
        });

        let result = mocks
            .into_pipeline(dir.path())
            .get_post_from_subreddit("aww", None)
            .await;

        assert_eq!(result.kind, MediaKind::Video);
        assert_eq!(result.content, "https://litter.catbox.moe/xyz.mp4");
        assert_eq!(result.source_url.as_deref(), Some("https://www.reddit.com/r/aww/comments/abc/cat/"));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_subreddit_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::new();
        mocks.source.expect_random_submission().returning(|name| {
            Err(SubfetchError::SourceUnavailable(format!("can't find r/{}", name)))
        });

        let result = mocks
            .into_pipeline(dir.path())
            .get_post_from_subreddit("doesnotexist", None)
            .await;

        assert_eq!(result.kind, MediaKind::Error);
        assert_eq!(result.title, "SourceUnavailable");
        assert!(result.content.contains("can't find r/doesnotexist"));
    }

    #[tokio::test]
    async fn test_empty_listing_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::new();
        mocks.source
            .expect_listing_page()
            .withf(|name, page| name == "empty" && *page == PageKind::Top)
            .returning(|_, _| Ok(Vec::new()));

        let result = mocks
            .into_pipeline(dir.path())
            .get_post_from_subreddit("empty", Some(PageKind::Top))
            .await;

        assert_eq!(result.title, "SourceUnavailable");
    }

    #[tokio::test]
    async fn test_listing_page_post_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::new();
        mocks.source.expect_listing_page().returning(|_, _| {
            Ok(vec![Submission {
                title: "story".to_string(),
                url: "https://example.com/story".to_string(),
                ..Default::default()
            }])
        });

        let result = mocks
            .into_pipeline(dir.path())
            .get_post_from_subreddit("news", Some(PageKind::New))
            .await;

        assert_eq!(result.kind, MediaKind::ExternalLink);
        assert_eq!(result.content, "https://example.com/story");
    }

    #[tokio::test]
    async fn test_exhausted_transcode_retry_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::new();
        mocks.source.expect_random_submission().returning(|_| Ok(video_submission()));
        mocks.remote.expect_size_of().returning(|_| Ok(1024));
        mocks.transcoder.expect_mux().times(2).returning(|job| {
            std::fs::write(&job.output, b"partial")?;
            Err(SubfetchError::TranscodeFailed("invalid data found".to_string()))
        });
        mocks.host.expect_upload().never();

        let result = mocks
            .into_pipeline(dir.path())
            .get_post_from_subreddit("aww", None)
            .await;

        assert_eq!(result.kind, MediaKind::Error);
        assert_eq!(result.title, "TranscodeFailed");
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_disguised_host_error_becomes_relay_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::new();
        mocks.source.expect_random_submission().returning(|_| Ok(video_submission()));
        mocks.remote.expect_size_of().returning(|_| Ok(1024));
        mocks.transcoder.expect_mux().returning(|job| {
            std::fs::write(&job.output, b"mp4")?;
            Ok(())
        });
        mocks.host
            .expect_upload()
            .returning(|_| Ok("<html>Database Error: try again later</html>".to_string()));

        let result = mocks
            .into_pipeline(dir.path())
            .get_post_from_subreddit("aww", None)
            .await;

        assert_eq!(result.kind, MediaKind::Error);
        assert_eq!(result.title, "RelayFailed");
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_text_is_never_relayed() {
        let dir = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::new();
        mocks.host.expect_upload().never();

        let pipeline = mocks.into_pipeline(dir.path());
        let inside = dir.path().join("notes.txt").to_string_lossy().to_string();

        // Text whose body happens to look like a scratch path
        let text = PostResult::new("notes", inside.clone(), MediaKind::Text, None);
        assert_eq!(pipeline.assemble(text.clone()).await.unwrap(), text);

        let link = PostResult::new("link", "https://example.com", MediaKind::ExternalLink, None);
        assert_eq!(pipeline.assemble(link.clone()).await.unwrap(), link);
    }

    #[tokio::test]
    async fn test_oversized_video_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut mocks = Mocks::new();
        mocks.source.expect_random_submission().returning(|_| Ok(video_submission()));
        mocks.remote.expect_size_of().returning(|_| Ok(u64::MAX));
        mocks.transcoder.expect_mux().never();

        let result = mocks
            .into_pipeline(dir.path())
            .get_post_from_subreddit("aww", None)
            .await;

        assert_eq!(result.title, "TooLarge");
        assert_eq!(file_count(dir.path()), 0);
    }
}
