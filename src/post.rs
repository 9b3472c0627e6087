use serde::Serialize;
use std::fmt;

use crate::error::SubfetchError;

/// Media kind of a pipeline result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaKind {
    Video,
    Image,
    Text,
    ExternalLink,
    /// Pipeline failure; never produced by classification
    Error,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Image => "image",
            Self::Text => "text",
            Self::ExternalLink => "link",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Canonical output of one pipeline run.
///
/// `content` depends on `kind`: a scratch file path (before relay) or public
/// URL for video and image, the body for text, the URL for external links and
/// the error description for errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostResult {
    pub title: String,
    pub content: String,
    pub kind: MediaKind,
    /// Permalink of the submission, used when the content cannot be inlined
    pub source_url: Option<String>,
}

impl PostResult {
    pub fn new<T, C>(title: T, content: C, kind: MediaKind, source_url: Option<String>) -> Self
    where
        T: Into<String>,
        C: Into<String>,
    {
        Self {
            title: title.into(),
            content: content.into(),
            kind,
            source_url,
        }
    }

    /// Normalize a failure into an error result
    pub fn from_error(error: &SubfetchError) -> Self {
        Self::new(error.category(), error.to_string(), MediaKind::Error, None)
    }

    /// Copy of this result pointing at different content
    pub fn with_content<C: Into<String>>(&self, content: C) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MediaKind::Error
    }
}
