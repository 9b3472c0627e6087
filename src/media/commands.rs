use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubfetchError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add an input (local path or remote URL) preceded by its input options
    pub fn input<S: Into<String>>(self, source: S, input_options: &[String]) -> Self {
        self.args(input_options.iter().cloned()).arg("-i").arg(source)
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Select a stream for the output
    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.arg("-map").arg(stream)
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Execute the command, returning stdout on success
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SubfetchError::TranscodeFailed(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubfetchError::TranscodeFailed(format!(
                "{} failed: {}",
                self.description,
                last_lines(&stderr, 5)
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// ffmpeg prints its whole banner to stderr; only the tail explains a failure
fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}

/// Builder for common media processing operations
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build the mux command: muted video stream plus an optional separate
    /// audio stream, both stream-copied into one mp4
    pub fn mux<P: AsRef<Path>>(
        &self,
        video_url: &str,
        audio_url: Option<&str>,
        output_path: P,
        input_options: &[String],
        output_options: &[String],
    ) -> MediaCommand {
        let description = if audio_url.is_some() {
            "Video and audio mux"
        } else {
            "Video remux"
        };

        let mut cmd = MediaCommand::new(&self.binary_path, description)
            .overwrite()
            .input(video_url, input_options);

        if let Some(audio_url) = audio_url {
            cmd = cmd
                .input(audio_url, input_options)
                .map("0:v:0")
                .map("1:a:0");
        }

        cmd.copy_video()
            .copy_audio()
            .args(output_options.iter().cloned())
            .output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }
}
