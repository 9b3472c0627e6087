// Content source abstraction
//
// The pipeline only sees the SubmissionSource trait; RedditClient is the
// reqwest-backed implementation wired in by the binary.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use client::*;

use crate::error::{Result, SubfetchError};

/// One post record as returned by the reddit API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub media: Option<SubmissionMedia>,
    #[serde(default)]
    pub crosspost_parent_list: Option<Vec<Submission>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMedia {
    #[serde(default)]
    pub reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedditVideo {
    pub fallback_url: String,
    #[serde(default)]
    pub is_gif: bool,
}

impl Submission {
    /// Link to the submission on reddit, falling back to its URL
    pub fn source_url(&self) -> String {
        if self.permalink.is_empty() {
            self.url.clone()
        } else {
            format!("https://www.reddit.com{}", self.permalink)
        }
    }
}

/// Listing sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    Hot,
    New,
    Top,
    Rising,
    Controversial,
}

impl PageKind {
    pub const ALL: [PageKind; 5] = [
        PageKind::Hot,
        PageKind::New,
        PageKind::Top,
        PageKind::Rising,
        PageKind::Controversial,
    ];

    /// Path segment of the listing endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::New => "new",
            Self::Top => "top",
            Self::Rising => "rising",
            Self::Controversial => "controversial",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = SubfetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hot" => Ok(Self::Hot),
            "new" => Ok(Self::New),
            "top" => Ok(Self::Top),
            "rising" => Ok(Self::Rising),
            "controversial" => Ok(Self::Controversial),
            _ => Err(SubfetchError::SourceUnavailable(format!(
                "Invalid page kind '{}'. Valid kinds: hot, new, top, rising, controversial",
                s
            ))),
        }
    }
}

/// Source of submissions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    /// Fetch one random submission from a subreddit
    async fn random_submission(&self, subreddit: &str) -> Result<Submission>;

    /// Fetch one page of a subreddit listing
    async fn listing_page(&self, subreddit: &str, page: PageKind) -> Result<Vec<Submission>>;
}
