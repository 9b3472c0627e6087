use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubfetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Size probe failed: {0}")]
    ProbeFailed(String),

    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    #[error("Relay upload failed: {0}")]
    RelayFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Media too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discord error: {0}")]
    Discord(String),
}

impl SubfetchError {
    /// Short category shown as the title of an error reply
    pub fn category(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "SourceUnavailable",
            Self::ProbeFailed(_) => "ProbeFailed",
            Self::TranscodeFailed(_) => "TranscodeFailed",
            Self::RelayFailed(_) => "RelayFailed",
            Self::DownloadFailed(_) => "DownloadFailed",
            Self::TooLarge { .. } => "TooLarge",
            Self::Io(_)
            | Self::Json(_)
            | Self::Toml(_)
            | Self::Http(_)
            | Self::Config(_)
            | Self::Discord(_) => "InternalError",
        }
    }
}

pub type Result<T> = std::result::Result<T, SubfetchError>;
