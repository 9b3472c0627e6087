use tracing::debug;

use crate::post::MediaKind;
use crate::reddit::Submission;

const IMAGE_MARKERS: [&str; 3] = [".png", ".jpg", ".gif"];
const COMMENTS_MARKER: &str = "/comments/";

/// What the acquirer needs for each media kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Video { fallback_url: String, is_gif: bool },
    Image { url: String },
    Text,
    ExternalLink,
}

impl Classified {
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::Video { .. } => MediaKind::Video,
            Self::Image { .. } => MediaKind::Image,
            Self::Text => MediaKind::Text,
            Self::ExternalLink => MediaKind::ExternalLink,
        }
    }
}

/// A submission after crosspost resolution and classification
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedSubmission {
    pub classified: Classified,
    /// Sanitized title, safe to derive file names from
    pub title: String,
    /// The origin submission (the crosspost parent if there was one)
    pub submission: Submission,
}

impl ClassifiedSubmission {
    pub fn media_kind(&self) -> MediaKind {
        self.classified.media_kind()
    }
}

/// Substitute the origin submission for a crosspost
pub fn resolve_crosspost(submission: &Submission) -> Submission {
    match submission.crosspost_parent_list.as_deref() {
        Some([origin, ..]) => {
            debug!("Resolved crosspost '{}' to its origin '{}'", submission.title, origin.title);
            origin.clone()
        }
        _ => submission.clone(),
    }
}

/// Classify a raw submission. Pure; no I/O.
pub fn classify(submission: &Submission) -> ClassifiedSubmission {
    let submission = resolve_crosspost(submission);

    let video = submission
        .media
        .as_ref()
        .and_then(|media| media.reddit_video.as_ref());

    let classified = if let Some(video) = video {
        Classified::Video {
            fallback_url: video.fallback_url.clone(),
            is_gif: video.is_gif,
        }
    } else if IMAGE_MARKERS.iter().any(|marker| submission.url.contains(marker)) {
        Classified::Image {
            url: submission.url.clone(),
        }
    } else if submission.url.contains(COMMENTS_MARKER) {
        Classified::Text
    } else {
        Classified::ExternalLink
    };

    debug!("Classified '{}' as {}", submission.title, classified.media_kind());

    ClassifiedSubmission {
        classified,
        title: sanitize_title(&submission.title),
        submission,
    }
}

/// Make a title usable as a file name stem
pub fn sanitize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return "untitled".to_string();
    }
    if trimmed == "." {
        return "[dot]".to_string();
    }

    title.replace('/', "|").replace('"', "˝")
}
