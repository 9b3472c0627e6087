use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::Result;

/// File names are limited to 255 bytes; leave room for the suffix and extension
const MAX_STEM_BYTES: usize = 200;

/// Directory holding transient downloaded and muxed media
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it is missing
    pub fn ensure_exists(&self) -> Result<()> {
        if self.root.is_dir() {
            info!("Media folder exists: {}", self.root.display());
        } else {
            info!("Media folder does not exist: {}", self.root.display());
            std::fs::create_dir_all(&self.root)?;
            info!("Media folder created");
        }
        Ok(())
    }

    /// Delete files orphaned by earlier runs, returning how many were removed
    pub fn clean(&self) -> Result<u64> {
        let mut removed = 0;

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {}: {}", entry.path().display(), e),
            }
        }

        info!("Cleaned {} media files", removed);
        Ok(removed)
    }

    /// Unique file path for a sanitized title.
    ///
    /// Each call appends a fresh suffix, so concurrent runs acquiring posts
    /// with the same title never share a file.
    pub fn file_path(&self, title: &str, extension: &str) -> PathBuf {
        let mut stem = String::new();
        for c in title.chars() {
            if stem.len() + c.len_utf8() > MAX_STEM_BYTES {
                break;
            }
            stem.push(c);
        }
        let suffix = Uuid::new_v4().simple().to_string();
        self.root.join(format!("{}_{}.{}", stem, &suffix[..8], extension))
    }

    /// Whether a result's content refers to a file in this directory
    pub fn contains(&self, content: &str) -> bool {
        !self.root.as_os_str().is_empty() && Path::new(content).starts_with(&self.root)
    }
}

/// Best-effort removal of a scratch file; errors are logged and swallowed
pub async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!("Removed scratch file {}", path.display()),
        Err(e) => debug!("Could not remove scratch file {}: {}", path.display(), e),
    }
}
