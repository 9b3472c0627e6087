use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, SubfetchError};

// Default values for optional configuration keys
fn default_command_name() -> String {
    "reddit".to_string()
}

fn default_error_markers() -> Vec<String> {
    vec!["database error".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub reddit: RedditConfig,
    pub media: MediaConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Name of the registered slash command
    #[serde(default = "default_command_name")]
    pub command_name: String,
    /// Subreddits picked from when the user gives none
    pub default_subreddits: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    /// User agent sent with every reddit request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Directory for transient downloaded and muxed media
    pub scratch_dir: PathBuf,
    /// Maximum remote payload size in bytes before any fetch or transcode
    pub upload_limit: u64,
    /// How image posts are acquired
    pub image_mode: ImageMode,
    /// Options placed before every `-i` input
    /// Common options: ["-threads", "1"]
    pub input_options: Vec<String>,
    /// Additional options placed before the output path
    pub output_options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMode {
    /// Reference: reply with the remote image URL, nothing touches disk
    Reference,
    /// Download: fetch into the scratch directory and relay it
    Download,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Upload endpoint of the temporary file host
    pub endpoint: String,
    /// Retention requested from the host (1h, 12h, 24h, 72h)
    pub retention: String,
    /// Response fragments that mean the host failed despite a success status
    #[serde(default = "default_error_markers")]
    pub error_markers: Vec<String>,
}

/// Secrets read from the environment, never from the config file
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub discord_token: Option<String>,
    pub reddit: Option<RedditCredentials>,
}

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig {
                command_name: default_command_name(),
                default_subreddits: vec![
                    "aww".to_string(),
                    "earthporn".to_string(),
                    "oddlysatisfying".to_string(),
                    "interestingasfuck".to_string(),
                ],
            },
            reddit: RedditConfig {
                user_agent: "subfetch/0.1.0 (discord bot)".to_string(),
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                scratch_dir: PathBuf::from(".subfetch/media"),
                upload_limit: 25 * 1024 * 1024,
                image_mode: ImageMode::Reference,
                input_options: vec!["-threads".to_string(), "1".to_string()],
                output_options: vec![
                    // "-movflags".to_string(), "+faststart".to_string(),
                ],
            },
            relay: RelayConfig {
                endpoint: "https://litterbox.catbox.moe/resources/internals/api.php".to_string(),
                retention: "1h".to_string(),
                error_markers: default_error_markers(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubfetchError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubfetchError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubfetchError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubfetchError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

impl Credentials {
    /// Read secrets from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from any key lookup; reddit OAuth is enabled only
    /// when all three reddit variables are present and non-empty
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let reddit = match (
            get("REDDIT_CLIENT_ID"),
            get("REDDIT_CLIENT_SECRET"),
            get("REDDIT_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Some(RedditCredentials {
                client_id,
                client_secret,
                refresh_token,
            }),
            _ => None,
        };

        Self {
            discord_token: get("DISCORD_TOKEN"),
            reddit,
        }
    }

    pub fn require_discord_token(&self) -> Result<&str> {
        self.discord_token
            .as_deref()
            .ok_or_else(|| SubfetchError::Config("DISCORD_TOKEN is not set".to_string()))
    }
}
